use thiserror::Error;

use crate::chunk::{ChunkDecodeError, ChunkEncodeError};

#[derive(Debug, Error)]
pub enum UserControlMessageError {
    #[error("payload too short for this user control message")]
    TooShort,
    #[error(transparent)]
    Encode(#[from] ChunkEncodeError),
    #[error(transparent)]
    Decode(#[from] ChunkDecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
