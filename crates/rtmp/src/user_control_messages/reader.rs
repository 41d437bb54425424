use bytes::{Buf, Bytes};
use rtmp_bytes_util::BytesCursorExt;

use super::define::{EventType, UserControlMessage};
use super::error::UserControlMessageError;

/// Parses a USER_CONTROL_EVENT message payload (2-byte event type followed
/// by event-specific fields).
pub fn read_user_control_message(mut payload: &Bytes) -> Result<UserControlMessage, UserControlMessageError> {
    let event_type = payload.try_get_u16().ok_or(UserControlMessageError::TooShort)?;

    match EventType::from_u16(event_type) {
        Some(EventType::StreamBegin) => Ok(UserControlMessage::StreamBegin {
            stream_id: payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?,
        }),
        Some(EventType::StreamEof) => Ok(UserControlMessage::StreamEof {
            stream_id: payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?,
        }),
        Some(EventType::StreamDry) => Ok(UserControlMessage::StreamDry {
            stream_id: payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?,
        }),
        Some(EventType::SetBufferLength) => {
            let stream_id = payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?;
            let buffer_length_ms = payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?;
            Ok(UserControlMessage::SetBufferLength { stream_id, buffer_length_ms })
        }
        Some(EventType::StreamIsRecorded) => Ok(UserControlMessage::StreamIsRecorded {
            stream_id: payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?,
        }),
        Some(EventType::PingRequest) => Ok(UserControlMessage::PingRequest {
            timestamp: payload.try_get_u32().ok_or(UserControlMessageError::TooShort)?,
        }),
        _ => Ok(UserControlMessage::Unknown { event_type }),
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, WriteBytesExt};

    use super::*;

    #[test]
    fn reads_ping_request() {
        let mut buf = Vec::new();
        buf.write_u16::<BigEndian>(EventType::PingRequest as u16).unwrap();
        buf.write_u32::<BigEndian>(0xDEAD_BEEF).unwrap();

        let msg = read_user_control_message(&Bytes::from(buf)).unwrap();
        assert_eq!(msg, UserControlMessage::PingRequest { timestamp: 0xDEAD_BEEF });
    }

    #[test]
    fn unknown_event_type_is_carried_not_rejected() {
        let mut buf = Vec::new();
        buf.write_u16::<BigEndian>(99).unwrap();

        let msg = read_user_control_message(&Bytes::from(buf)).unwrap();
        assert_eq!(msg, UserControlMessage::Unknown { event_type: 99 });
    }
}
