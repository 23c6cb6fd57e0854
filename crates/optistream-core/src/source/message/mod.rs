//! Message framing inside each UDP datagram.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::MessageError;
pub use parser::{Message, encode_message, parse_message, server_info_payload};
