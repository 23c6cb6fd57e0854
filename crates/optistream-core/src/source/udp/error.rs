use thiserror::Error;

/// Failures while peeling a link-layer frame down to its UDP payload.
///
/// # Examples
/// ```
/// use optistream_core::source::udp::UdpError;
///
/// let err = UdpError::TooShort { needed: 8, actual: 3 };
/// assert!(err.to_string().contains("need 8 bytes"));
/// ```
#[derive(Debug, Error)]
pub enum UdpError {
    #[error("packet slice error: {0}")]
    Slice(String),
    #[error("missing network layer in packet")]
    MissingNetworkLayer,
    #[error("missing IP payload in packet")]
    MissingIpPayload,
    #[error("UDP datagram too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
