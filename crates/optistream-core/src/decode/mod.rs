//! Schema-driven binary decoding.
//!
//! The decoder walks a `LayoutDescriptor` over a byte buffer and produces a
//! nested `ParsedNode` plus the cursor where it stopped. Layered like the
//! other byte-level modules:
//! - `reader`: bounds-checked little-endian access
//! - `parser`: layout walk, group counts, sentinels, cursor bookkeeping
//! - `node`: the parsed tree and the typed asset-child selector
//! - `encoder`: the inverse walk, for fixtures and replays
//! - `error`: explicit, offset-carrying errors
//!
//! Decoding is pure and synchronous; nothing here allocates beyond what the
//! buffer proves it can hold.

pub mod encoder;
pub mod error;
pub mod node;
pub mod parser;
pub mod reader;

pub use encoder::{encode, encode_into};
pub use error::{DecodeError, EncodeError};
pub use node::{AssetChild, InvalidSelector, ParsedNode};
pub use parser::{decode, decode_asset};
