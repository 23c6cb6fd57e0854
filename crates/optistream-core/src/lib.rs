//! optistream core library: schema-driven decoding of motion-capture
//! streams into flat, export-ready tables.
//!
//! Buffers flow through four layers. `schema` holds the immutable
//! asset-type -> layout registries. `decode` walks a layout over a byte
//! buffer and produces a nested `ParsedNode` plus the cursor where it ended.
//! `extract` flattens a parsed tree into `FlatRecord`s through a per-asset
//! rule table. `frame` sequences whole frame-of-data and model-definition
//! payloads into per-cycle buckets. On top, `session` owns the
//! session-scoped accumulators and drives a `source::Transport`. All I/O
//! lives in `source` and in materialization.
//!
//! Invariants:
//! - Decoding is pure; a buffer either commits completely or not at all.
//! - Identity anchors and relative offsets never reach exported records.
//! - Container identity crossed while flattening (skeleton of a rigid body,
//!   plate of a channel sample) is not carried into records.
//! - One protocol version; the announced version is logged, not used to
//!   select layouts.
//!
//! Version française (résumé):
//! Cette crate décode des flux de capture de mouvement à partir de schémas :
//! registres de layouts -> décodeur -> extracteurs à plat -> agrégation par
//! trame -> accumulateurs de session. Les E/S restent dans `source` et dans
//! l'export CSV/JSON. Un buffer invalide n'altère jamais l'état accumulé.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use optistream_core::{PcapReplay, SessionConfig, StreamingCoordinator, Value};
//!
//! let config = SessionConfig::default();
//! let replay = PcapReplay::new("session.pcapng", &config);
//! let mut session = StreamingCoordinator::new(replay, config);
//! session.start()?;
//! session.run()?;
//! session.update_frame([("participant_id", Value::Int(7))], None)?;
//! session.materialize(Path::new("out"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod asset;
pub mod decode;
pub mod error;
pub mod extract;
pub mod frame;
pub mod record;
pub mod schema;
pub mod session;
pub mod source;

pub use asset::{AssetType, RegistryKind, UnknownAssetName};
pub use decode::{
    AssetChild, DecodeError, EncodeError, InvalidSelector, ParsedNode, decode, decode_asset,
    encode, encode_into,
};
pub use error::ErrorKind;
pub use extract::{ExtractError, Unpacker, flatten};
pub use frame::{FrameBucket, FrameDecoder, FrameError, FrameSnapshot};
pub use record::{FlatRecord, Value};
pub use schema::{LayoutDescriptor, SchemaError, SchemaRegistry};
pub use session::{
    AccumulatorStore, Manifest, SessionConfig, SessionError, SessionStats, StopHandle,
    StreamingCoordinator,
};
pub use source::{
    PacketEvent, PacketSource, PcapFileSource, PcapReplay, ProtocolVersion, QueueTransport,
    SourceError, StreamEvent, Transport,
};
