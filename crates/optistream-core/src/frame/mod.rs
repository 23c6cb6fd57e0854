//! Per-cycle aggregation of flattened records.
//!
//! A `FrameBucket` collects every record produced while handling one buffer,
//! keyed by asset type. Data-frame buckets append on each `log`; description
//! buckets keep only the latest set per tag, because a description is a
//! point-in-time catalog rather than a series. `packet` turns whole
//! frame-of-data and model-definition payloads into buckets.

pub mod builder;
pub mod error;
pub mod packet;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::asset::{AssetType, RegistryKind};
use crate::record::FlatRecord;
use crate::schema::SchemaRegistry;

pub use error::FrameError;
pub use builder::{
    encode_frame_of_data, encode_model_definitions, prefix_node, suffix_node,
};
pub use packet::{FrameDecoder, dataset_id, dataset_tags};

/// Records gathered during one decode cycle.
#[derive(Debug, Clone)]
pub struct FrameBucket {
    kind: RegistryKind,
    records: BTreeMap<AssetType, Vec<FlatRecord>>,
}

impl FrameBucket {
    /// Bucket tracking exactly `tags`, each starting empty.
    pub fn new(kind: RegistryKind, tags: impl IntoIterator<Item = AssetType>) -> Self {
        Self {
            kind,
            records: tags.into_iter().map(|tag| (tag, Vec::new())).collect(),
        }
    }

    /// Bucket tracking every tag `registry` has a layout for.
    pub fn for_registry(registry: &SchemaRegistry) -> Self {
        Self::new(registry.kind(), registry.tags())
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Add `records` under `tag`: appended for data frames, replacing the
    /// previous set for descriptions.
    ///
    /// # Errors
    /// Returns `FrameError::UntrackedAssetType` when the bucket was not
    /// created with `tag`.
    pub fn log(&mut self, tag: AssetType, records: Vec<FlatRecord>) -> Result<(), FrameError> {
        let slot = self
            .records
            .get_mut(&tag)
            .ok_or(FrameError::UntrackedAssetType {
                tag,
                registry: self.kind,
            })?;
        match self.kind {
            RegistryKind::DataFrame => slot.extend(records),
            RegistryKind::Description => *slot = records,
        }
        Ok(())
    }

    /// Snapshot of every tracked tag, empty sequences included.
    pub fn export(&self) -> FrameSnapshot {
        FrameSnapshot {
            kind: self.kind,
            records: self.records.clone(),
        }
    }

    pub fn into_snapshot(self) -> FrameSnapshot {
        FrameSnapshot {
            kind: self.kind,
            records: self.records,
        }
    }
}

/// Read-only view of a bucket's content at export time.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    kind: RegistryKind,
    records: BTreeMap<AssetType, Vec<FlatRecord>>,
}

impl FrameSnapshot {
    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Records for `tag`; empty when the tag saw no activity or is not
    /// tracked.
    pub fn get(&self, tag: AssetType) -> &[FlatRecord] {
        self.records.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, tag: AssetType) -> bool {
        self.records.contains_key(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = AssetType> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetType, &[FlatRecord])> {
        self.records
            .iter()
            .map(|(tag, records)| (*tag, records.as_slice()))
    }

    pub fn total_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

impl Serialize for FrameSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (tag, records) in &self.records {
            map.serialize_entry(tag.key(), records)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::FrameBucket;
    use crate::asset::{AssetType, RegistryKind};
    use crate::error::ErrorKind;
    use crate::record::{FlatRecord, Value};
    use crate::schema::SchemaRegistry;

    fn rows(n: usize, tag: i64) -> Vec<FlatRecord> {
        (0..n)
            .map(|idx| {
                [("id", Value::Int(idx as i64)), ("batch", Value::Int(tag))]
                    .into_iter()
                    .collect()
            })
            .collect()
    }

    #[test]
    fn data_bucket_appends() {
        let mut bucket = FrameBucket::for_registry(&SchemaRegistry::data_frames());
        bucket.log(AssetType::RigidBody, rows(2, 1)).unwrap();
        bucket.log(AssetType::RigidBody, rows(3, 2)).unwrap();
        bucket.log(AssetType::LabeledMarker, rows(4, 3)).unwrap();

        let snapshot = bucket.export();
        assert_eq!(snapshot.get(AssetType::RigidBody).len(), 5);
        assert_eq!(snapshot.get(AssetType::LabeledMarker).len(), 4);
        assert_eq!(snapshot.total_records(), 9);
    }

    #[test]
    fn description_bucket_keeps_latest() {
        let mut bucket = FrameBucket::for_registry(&SchemaRegistry::descriptions());
        bucket.log(AssetType::MarkerSet, rows(6, 1)).unwrap();
        bucket.log(AssetType::MarkerSet, rows(2, 2)).unwrap();

        let snapshot = bucket.export();
        let markers = snapshot.get(AssetType::MarkerSet);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|row| row.get("batch") == Some(&Value::Int(2))));
    }

    #[test]
    fn export_includes_idle_tags() {
        let registry = SchemaRegistry::data_frames();
        let bucket = FrameBucket::for_registry(&registry);
        let snapshot = bucket.export();
        assert_eq!(snapshot.tags().count(), registry.tags().count());
        assert!(snapshot.contains(AssetType::Suffix));
        assert!(snapshot.get(AssetType::Suffix).is_empty());
    }

    #[test]
    fn export_is_detached_from_later_logs() {
        let mut bucket = FrameBucket::new(RegistryKind::DataFrame, [AssetType::Prefix]);
        let before = bucket.export();
        bucket.log(AssetType::Prefix, rows(1, 1)).unwrap();
        assert!(before.get(AssetType::Prefix).is_empty());
        assert_eq!(bucket.export().get(AssetType::Prefix).len(), 1);
    }

    #[test]
    fn logging_untracked_tag_fails() {
        let mut bucket = FrameBucket::for_registry(&SchemaRegistry::data_frames());
        let err = bucket.log(AssetType::Camera, rows(1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAssetType);
    }

    #[test]
    fn snapshot_serializes_with_accumulator_keys() {
        let mut bucket = FrameBucket::new(RegistryKind::DataFrame, [AssetType::RigidBody]);
        bucket.log(AssetType::RigidBody, rows(1, 5)).unwrap();
        let json = serde_json::to_string(&bucket.into_snapshot()).unwrap();
        assert_eq!(json, r#"{"RigidBodies":[{"id":0,"batch":5}]}"#);
    }
}
