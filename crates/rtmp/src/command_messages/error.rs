use thiserror::Error;

use crate::chunk::ChunkEncodeError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command message missing the command-name string")]
    MissingCommandName,
    #[error("command message missing the transaction id")]
    MissingTransactionId,
    #[error(transparent)]
    Amf0(#[from] rtmp_amf0::Amf0Error),
    #[error(transparent)]
    Encode(#[from] ChunkEncodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
