use super::error::MessageError;
use super::layout;
use super::reader::MessageReader;
use crate::source::ProtocolVersion;

/// One framed message, payload borrowed from the datagram.
#[derive(Debug, PartialEq)]
pub enum Message<'a> {
    ServerInfo {
        name: String,
        app_version: [u8; 4],
        protocol_version: ProtocolVersion,
    },
    ModelDefinition(&'a [u8]),
    FrameOfData(&'a [u8]),
    Other { message_id: u16 },
}

/// Split a datagram into header and payload and classify it by id.
///
/// Bytes after the declared payload are ignored.
pub fn parse_message(datagram: &[u8]) -> Result<Message<'_>, MessageError> {
    let reader = MessageReader::new(datagram);
    reader.require_len(layout::HEADER_LEN)?;
    let message_id = reader.read_u16_le(layout::MESSAGE_ID_RANGE)?;
    let size = usize::from(reader.read_u16_le(layout::PAYLOAD_SIZE_RANGE)?);
    let payload = reader.read_slice(layout::HEADER_LEN..layout::HEADER_LEN + size)?;

    let message = match message_id {
        layout::MSG_SERVER_INFO => {
            let body = MessageReader::new(payload);
            body.require_len(layout::SERVER_INFO_LEN)?;
            Message::ServerInfo {
                name: body.read_padded_text(0..layout::SERVER_NAME_LEN)?,
                app_version: body.read_array4(layout::APP_VERSION_RANGE)?,
                protocol_version: ProtocolVersion(
                    body.read_array4(layout::PROTOCOL_VERSION_RANGE)?,
                ),
            }
        }
        layout::MSG_MODEL_DEFINITION => Message::ModelDefinition(payload),
        layout::MSG_FRAME_OF_DATA => Message::FrameOfData(payload),
        message_id => Message::Other { message_id },
    };
    Ok(message)
}

/// Prefix `payload` with the message header.
///
/// # Errors
/// `MessageError::PayloadTooLarge` when the payload does not fit the u16
/// size field.
pub fn encode_message(message_id: u16, payload: &[u8]) -> Result<Vec<u8>, MessageError> {
    let size = u16::try_from(payload.len()).map_err(|_| MessageError::PayloadTooLarge {
        message_id,
        len: payload.len(),
    })?;
    let mut out = Vec::with_capacity(layout::HEADER_LEN + payload.len());
    out.extend_from_slice(&message_id.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Server-info payload announcing `name`; app and protocol version fields
/// both carry `version`.
pub fn server_info_payload(name: &str, version: ProtocolVersion) -> Vec<u8> {
    let mut payload = vec![0u8; layout::SERVER_INFO_LEN];
    let name = name.as_bytes();
    let len = name.len().min(layout::SERVER_NAME_LEN - 1);
    payload[..len].copy_from_slice(&name[..len]);
    payload[layout::APP_VERSION_RANGE].copy_from_slice(&version.0);
    payload[layout::PROTOCOL_VERSION_RANGE].copy_from_slice(&version.0);
    payload
}

#[cfg(test)]
mod tests {
    use super::{Message, encode_message, parse_message, server_info_payload};
    use crate::source::ProtocolVersion;
    use crate::source::message::error::MessageError;
    use crate::source::message::layout;

    #[test]
    fn frame_of_data_payload_is_bounded_by_size() {
        let mut datagram = encode_message(layout::MSG_FRAME_OF_DATA, &[1, 2, 3]).unwrap();
        datagram.push(0xff);
        assert_eq!(
            parse_message(&datagram).unwrap(),
            Message::FrameOfData(&[1, 2, 3])
        );
    }

    #[test]
    fn server_info_carries_protocol_version() {
        let version = ProtocolVersion([3, 1, 0, 0]);
        let datagram = encode_message(
            layout::MSG_SERVER_INFO,
            &server_info_payload("Motive", version),
        )
        .unwrap();
        match parse_message(&datagram).unwrap() {
            Message::ServerInfo {
                name,
                protocol_version,
                ..
            } => {
                assert_eq!(name, "Motive");
                assert_eq!(protocol_version, version);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn unknown_ids_are_passed_through() {
        let datagram = encode_message(9, &[]).unwrap();
        assert_eq!(
            parse_message(&datagram).unwrap(),
            Message::Other { message_id: 9 }
        );
    }

    #[test]
    fn declared_size_beyond_datagram_is_rejected() {
        let datagram = [7, 0, 10, 0, 1, 2];
        let err = parse_message(&datagram).unwrap_err();
        assert!(matches!(err, MessageError::TooShort { needed: 14, actual: 6 }));
    }

    #[test]
    fn short_server_info_is_rejected() {
        let datagram = encode_message(layout::MSG_SERVER_INFO, &[0u8; 16]).unwrap();
        assert!(parse_message(&datagram).is_err());
    }
}
