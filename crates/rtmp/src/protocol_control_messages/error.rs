use thiserror::Error;

use crate::chunk::{ChunkDecodeError, ChunkEncodeError};

#[derive(Debug, Error)]
pub enum ProtocolControlMessageError {
    #[error("payload too short for this protocol control message")]
    TooShort,
    #[error("unknown peer bandwidth limit type {0}")]
    UnknownLimitType(u8),
    #[error(transparent)]
    Encode(#[from] ChunkEncodeError),
    #[error(transparent)]
    Decode(#[from] ChunkDecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
