use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("message {message_id} payload of {len} bytes exceeds the u16 size field")]
    PayloadTooLarge { message_id: u16, len: usize },
}
