//! PCAP/PCAPNG capture reading.
//!
//! `PcapFileSource` handles file I/O and block parsing and emits raw
//! link-layer frames; UDP extraction and message framing happen upstream in
//! the replay transport.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
