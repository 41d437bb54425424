use bytes::{Buf, Bytes};
use rtmp_bytes_util::BytesCursorExt;

use super::define::{
    ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth, ProtocolControlMessageSetPeerBandwidthLimitType,
    ProtocolControlMessageWindowAcknowledgementSize,
};
use super::error::ProtocolControlMessageError;

impl ProtocolControlMessageSetChunkSize {
    pub fn read(mut payload: &Bytes) -> Result<Self, ProtocolControlMessageError> {
        let chunk_size = payload.try_get_u32().ok_or(ProtocolControlMessageError::TooShort)?;
        Ok(Self {
            chunk_size: chunk_size & 0x7FFF_FFFF,
        })
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    pub fn read(mut payload: &Bytes) -> Result<Self, ProtocolControlMessageError> {
        let acknowledgement_window_size = payload.try_get_u32().ok_or(ProtocolControlMessageError::TooShort)?;
        Ok(Self {
            acknowledgement_window_size,
        })
    }
}

impl ProtocolControlMessageSetPeerBandwidth {
    pub fn read(mut payload: &Bytes) -> Result<Self, ProtocolControlMessageError> {
        let acknowledgement_window_size = payload.try_get_u32().ok_or(ProtocolControlMessageError::TooShort)?;
        let limit_byte = payload.try_get_u8().ok_or(ProtocolControlMessageError::TooShort)?;
        let limit_type =
            ProtocolControlMessageSetPeerBandwidthLimitType::from_byte(limit_byte).ok_or(ProtocolControlMessageError::UnknownLimitType(limit_byte))?;
        Ok(Self {
            acknowledgement_window_size,
            limit_type,
        })
    }
}

/// Reads an ACK (message type 3) payload: a 32-bit sequence number.
pub fn read_acknowledgement(mut payload: &Bytes) -> Result<u32, ProtocolControlMessageError> {
    payload.try_get_u32().ok_or(ProtocolControlMessageError::TooShort)
}
