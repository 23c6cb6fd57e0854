//! Session-scoped streaming: transport events in, accumulated tables out.
//!
//! The coordinator pulls one buffer at a time from its transport, decodes it
//! into a bucket, then commits the bucket into the session accumulators and
//! notifies listeners. A buffer that fails anywhere before commit leaves the
//! accumulators exactly as they were.

pub mod config;
pub mod error;
pub mod store;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::asset::RegistryKind;
use crate::frame::{FrameDecoder, FrameSnapshot};
use crate::record::Value;
use crate::source::{StreamEvent, Transport};

pub use config::SessionConfig;
pub use error::SessionError;
pub use store::AccumulatorStore;

/// File written next to the tables by `materialize`.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Callback invoked with each committed snapshot.
pub type Listener = Box<dyn FnMut(&FrameSnapshot) + Send>;

/// Cloneable flag that halts the run loop between buffers.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub data_frames: u64,
    pub descriptions: u64,
    pub rejected: u64,
}

/// Summary of one `materialize` call, also written as `manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub generated_at: Option<String>,
    pub registry: String,
    pub tables: BTreeMap<&'static str, usize>,
    pub stats: SessionStats,
    #[serde(skip)]
    pub files: Vec<PathBuf>,
}

pub struct StreamingCoordinator<T: Transport> {
    transport: T,
    config: SessionConfig,
    decoder: FrameDecoder,
    frames: AccumulatorStore,
    descriptions: AccumulatorStore,
    frame_listener: Option<Listener>,
    description_listener: Option<Listener>,
    stop: StopHandle,
    running: bool,
    stats: SessionStats,
}

impl<T: Transport> StreamingCoordinator<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let decoder = FrameDecoder::new(config.allow_unverified_layouts);
        let frames = AccumulatorStore::for_registry(decoder.data_registry());
        let descriptions = AccumulatorStore::for_registry(decoder.description_registry());
        Self {
            transport,
            config,
            decoder,
            frames,
            descriptions,
            frame_listener: None,
            description_listener: None,
            stop: StopHandle::default(),
            running: false,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Listener for committed data frames; replaces any previous one.
    pub fn on_frame(&mut self, listener: impl FnMut(&FrameSnapshot) + Send + 'static) {
        self.frame_listener = Some(Box::new(listener));
    }

    /// Listener for committed description snapshots; replaces any previous
    /// one.
    pub fn on_description(&mut self, listener: impl FnMut(&FrameSnapshot) + Send + 'static) {
        self.description_listener = Some(Box::new(listener));
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Empty every accumulator, then start the transport.
    ///
    /// Returns the transport's handshake result.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        self.frames.reset();
        self.descriptions.reset();
        self.stats = SessionStats::default();
        self.stop.clear();

        self.running = self.transport.start()?;
        info!(running = self.running, "session started");
        Ok(self.running)
    }

    /// Stop delivery. Accumulators are kept for export.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.transport.stop();
        if self.running {
            self.running = false;
            info!(
                data_frames = self.stats.data_frames,
                descriptions = self.stats.descriptions,
                rejected = self.stats.rejected,
                "session stopped"
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.stop.is_stopped()
    }

    /// Decode one buffer and commit it.
    ///
    /// # Errors
    /// `SessionError::NotStarted` outside a running session; any decode or
    /// extraction error for the buffer, in which case nothing is committed.
    pub fn handle_event(&mut self, event: &StreamEvent) -> Result<(), SessionError> {
        if !self.running {
            return Err(SessionError::NotStarted);
        }

        let decoded = match event.kind {
            RegistryKind::DataFrame => self.decoder.decode_frame_of_data(&event.payload),
            RegistryKind::Description => self.decoder.decode_model_definitions(&event.payload),
        };
        let snapshot = match decoded {
            Ok(bucket) => bucket.into_snapshot(),
            Err(err) => {
                self.stats.rejected += 1;
                warn!(
                    registry = %event.kind,
                    kind = %err.kind(),
                    error = %err,
                    "buffer rejected"
                );
                return Err(err.into());
            }
        };

        debug!(
            registry = %event.kind,
            version = %event.version,
            records = snapshot.total_records(),
            "buffer committed"
        );
        match event.kind {
            RegistryKind::DataFrame => {
                self.frames.append(&snapshot);
                self.stats.data_frames += 1;
                if let Some(listener) = self.frame_listener.as_mut() {
                    listener(&snapshot);
                }
            }
            RegistryKind::Description => {
                self.descriptions.replace(&snapshot);
                self.stats.descriptions += 1;
                if let Some(listener) = self.description_listener.as_mut() {
                    listener(&snapshot);
                }
            }
        }
        Ok(())
    }

    /// Pull and handle one event. `Ok(false)` once the transport is
    /// exhausted or a stop was requested.
    pub fn poll(&mut self) -> Result<bool, SessionError> {
        if !self.is_running() {
            return Ok(false);
        }
        let Some(event) = self.transport.next_event()? else {
            return Ok(false);
        };
        self.handle_event(&event)?;
        Ok(true)
    }

    /// Handle events until the transport is exhausted or stopped, then stop.
    ///
    /// Rejected buffers are skipped unless `stop_on_error` is set.
    pub fn run(&mut self) -> Result<SessionStats, SessionError> {
        loop {
            match self.poll() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if err.is_buffer_error() && !self.config.stop_on_error => {}
                Err(err) => {
                    self.stop();
                    return Err(err);
                }
            }
        }
        self.stop();
        Ok(self.stats)
    }

    /// Data-frame accumulators.
    pub fn export(&self) -> &AccumulatorStore {
        &self.frames
    }

    /// Description accumulators.
    pub fn descexport(&self) -> &AccumulatorStore {
        &self.descriptions
    }

    /// Stamp `values` onto every existing row of the `into` accumulators
    /// (all of them when `None`).
    ///
    /// # Errors
    /// `SessionError::InvalidAssetType` when a target is not an accumulator
    /// key; no accumulator is modified in that case.
    pub fn update_frame<I, K>(&mut self, values: I, into: Option<&[&str]>) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.frames.update(values, into)
    }

    /// Write data-frame tables and a manifest into `dir`.
    pub fn materialize(&self, dir: &Path) -> Result<Manifest, SessionError> {
        self.write_tables(&self.frames, RegistryKind::DataFrame, dir)
    }

    /// Write description tables and a manifest into `dir`.
    pub fn materialize_descriptions(&self, dir: &Path) -> Result<Manifest, SessionError> {
        self.write_tables(&self.descriptions, RegistryKind::Description, dir)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    fn write_tables(
        &self,
        store: &AccumulatorStore,
        registry: RegistryKind,
        dir: &Path,
    ) -> Result<Manifest, SessionError> {
        let files = store.write_csv(dir)?;
        let manifest = Manifest {
            generated_at: manifest_timestamp(),
            registry: registry.to_string(),
            tables: store.row_counts(),
            stats: self.stats,
            files,
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        info!(
            dir = %dir.display(),
            tables = manifest.tables.len(),
            rows = store.total_rows(),
            "materialized {registry} tables"
        );
        Ok(manifest)
    }
}

fn manifest_timestamp() -> Option<String> {
    match OffsetDateTime::now_utc().format(&Rfc3339) {
        Ok(stamp) => Some(stamp),
        Err(err) => {
            warn!(%err, "manifest written without generated_at");
            None
        }
    }
}

impl<T: Transport> Drop for StreamingCoordinator<T> {
    fn drop(&mut self) {
        self.transport.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{MANIFEST_FILE, SessionConfig, StreamingCoordinator, manifest_timestamp};
    use crate::asset::AssetType;
    use crate::decode::ParsedNode;
    use crate::error::ErrorKind;
    use crate::frame::{encode_frame_of_data, prefix_node, suffix_node};
    use crate::record::Value;
    use crate::schema::SchemaRegistry;
    use crate::source::{QueueTransport, StreamEvent};

    fn rigid_body(id: i32) -> ParsedNode {
        ParsedNode::new("rigid_body")
            .with_field("id", id)
            .with_field("x", 1.0f32)
            .with_field("y", 2.0f32)
            .with_field("z", 3.0f32)
            .with_field("qx", 0.0f32)
            .with_field("qy", 0.0f32)
            .with_field("qz", 0.0f32)
            .with_field("qw", 1.0f32)
            .with_field("mean_error", 0.001f32)
            .with_field("params", 1)
    }

    fn frame(number: i32, bodies: i32) -> StreamEvent {
        let rigid_bodies = ParsedNode::new("rigid_bodies")
            .with_group("rigid_bodies", (0..bodies).map(rigid_body).collect());
        let payload = encode_frame_of_data(
            &SchemaRegistry::data_frames(),
            &[
                (AssetType::Prefix, prefix_node(number)),
                (AssetType::RigidBody, rigid_bodies),
                (AssetType::Suffix, suffix_node(f64::from(number) / 120.0)),
            ],
        )
        .unwrap();
        StreamEvent::frame(payload)
    }

    fn coordinator(events: Vec<StreamEvent>) -> StreamingCoordinator<QueueTransport> {
        StreamingCoordinator::new(events.into_iter().collect(), SessionConfig::default())
    }

    #[test]
    fn run_accumulates_rows_in_arrival_order() {
        let mut session = coordinator(vec![frame(1, 2), frame(2, 3)]);
        assert!(session.start().unwrap());
        let stats = session.run().unwrap();

        assert_eq!(stats.data_frames, 2);
        let store = session.export();
        assert_eq!(store.get(AssetType::RigidBody).len(), 5);
        let frames: Vec<_> = store
            .get(AssetType::Prefix)
            .iter()
            .map(|row| row.get("frame_number").cloned())
            .collect();
        assert_eq!(frames, [Some(Value::Int(1)), Some(Value::Int(2))]);
        assert!(!session.is_running());
    }

    #[test]
    fn malformed_buffer_is_skipped_without_partial_rows() {
        let mut truncated = frame(2, 3);
        truncated.payload.truncate(20);
        let mut session = coordinator(vec![frame(1, 1), truncated, frame(3, 1)]);
        session.start().unwrap();
        let stats = session.run().unwrap();

        assert_eq!(stats.data_frames, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(session.export().get(AssetType::RigidBody).len(), 2);
        assert_eq!(session.export().get(AssetType::Prefix).len(), 2);
    }

    #[test]
    fn stop_on_error_surfaces_the_decode_error() {
        let mut truncated = frame(1, 1);
        truncated.payload.truncate(3);
        let config = SessionConfig {
            stop_on_error: true,
            ..SessionConfig::default()
        };
        let mut session = StreamingCoordinator::new(
            [truncated, frame(2, 1)].into_iter().collect::<QueueTransport>(),
            config,
        );
        session.start().unwrap();
        let err = session.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);
        assert_eq!(session.export().total_rows(), 0);
        assert_eq!(session.transport().pending(), 1);
    }

    #[test]
    fn handle_event_requires_start() {
        let mut session = coordinator(Vec::new());
        let err = session.handle_event(&frame(1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn refused_handshake_reports_false() {
        let mut session =
            StreamingCoordinator::new(QueueTransport::refusing(), SessionConfig::default());
        assert!(!session.start().unwrap());
        assert!(!session.poll().unwrap());
    }

    #[test]
    fn start_clears_previous_session() {
        let mut session = coordinator(Vec::new());
        session.start().unwrap();
        session.handle_event(&frame(1, 4)).unwrap();
        assert_eq!(session.export().get(AssetType::RigidBody).len(), 4);

        session.stop();
        session.start().unwrap();
        assert_eq!(session.export().total_rows(), 0);
        assert_eq!(session.stats().data_frames, 0);
    }

    #[test]
    fn update_frame_stamps_all_or_selected_tables() {
        let mut session = coordinator(vec![frame(1, 2)]);
        session.start().unwrap();
        session.run().unwrap();

        session
            .update_frame([("participant_id", Value::Int(7))], None)
            .unwrap();
        session
            .update_frame([("trial", Value::Int(3))], Some(&["RigidBodies"]))
            .unwrap();

        let store = session.export();
        for (_, rows) in store.iter() {
            assert!(rows.iter().all(|r| r.get("participant_id") == Some(&Value::Int(7))));
        }
        assert!(
            store
                .get(AssetType::RigidBody)
                .iter()
                .all(|r| r.get("trial") == Some(&Value::Int(3)))
        );
        assert!(!store.get(AssetType::Prefix)[0].contains("trial"));

        let err = session
            .update_frame([("trial", Value::Int(4))], Some(&["Bogus"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAssetType);
        assert_eq!(
            session.export().get(AssetType::RigidBody)[0].get("trial"),
            Some(&Value::Int(3))
        );
    }

    #[test]
    fn listener_sees_each_committed_frame() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut session = coordinator(vec![frame(1, 1), frame(2, 2)]);
        session.on_frame(move |snapshot| {
            sink.lock()
                .unwrap()
                .push(snapshot.get(AssetType::RigidBody).len());
        });
        session.start().unwrap();
        session.run().unwrap();
        assert_eq!(*seen.lock().unwrap(), [1, 2]);
    }

    #[test]
    fn stop_handle_halts_between_buffers() {
        let mut session = coordinator(vec![frame(1, 1), frame(2, 1), frame(3, 1)]);
        let handle = session.stop_handle();
        session.on_frame(move |_| handle.stop());
        session.start().unwrap();
        let stats = session.run().unwrap();
        assert_eq!(stats.data_frames, 1);
    }

    #[test]
    fn materialize_writes_tables_and_manifest() {
        let mut session = coordinator(vec![frame(1, 2)]);
        session.start().unwrap();
        session.run().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let manifest = session.materialize(dir.path()).unwrap();
        assert_eq!(manifest.tables.get("RigidBodies"), Some(&2));
        assert!(manifest.generated_at.is_some());

        let csv = std::fs::read_to_string(dir.path().join("RigidBodies.csv")).unwrap();
        assert!(csv.starts_with("id,x,y,z,qx,qy,qz,qw,mean_error,params\n"));
        assert_eq!(csv.lines().count(), 3);

        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(json["tables"]["Prefix"], 1);
        assert_eq!(json["registry"], "data frame");
    }

    #[test]
    fn manifest_timestamp_is_utc_rfc3339() {
        let stamp = manifest_timestamp().unwrap();
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert_eq!(stamp.as_bytes()[10], b'T');
    }
}
