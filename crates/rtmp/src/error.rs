//! The session-level error type: the only error surfaced across
//! the crate boundary. Every component error composes into it via `#[from]`
//! so internals stay modular while callers match on one type.

use thiserror::Error;

use crate::chunk::{ChunkDecodeError, ChunkEncodeError};
use crate::command_messages::CommandError;
use crate::config::ConfigError;
use crate::handshake::HandshakeError;
use crate::messages::MessageError;
use crate::protocol_control_messages::ProtocolControlMessageError;
use crate::transport::TransportError;
use crate::user_control_messages::UserControlMessageError;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    #[error("write timed out")]
    WriteTimeout,
    #[error("ack-wait timed out: the server stopped acknowledging sent bytes")]
    AckTimeout,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    ChunkDecode(#[from] ChunkDecodeError),
    #[error(transparent)]
    ChunkEncode(#[from] ChunkEncodeError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    ProtocolControl(#[from] ProtocolControlMessageError),
    #[error(transparent)]
    UserControl(#[from] UserControlMessageError),
    #[error(transparent)]
    Amf0(#[from] rtmp_amf0::Amf0Error),
    #[error(transparent)]
    H264(#[from] rtmp_h264::H264Error),
    #[error(transparent)]
    Aac(#[from] rtmp_aac::AacError),
    #[error("server rejected the session: {0}")]
    Server(String),
    #[error("invalid state: expected {expected}, was {actual}")]
    InvalidState { expected: &'static str, actual: &'static str },
    #[error(transparent)]
    InvalidArgument(#[from] ConfigError),
    #[error("a send is already in progress on this connection")]
    Busy,
    #[error("the session actor has already shut down")]
    Closed,
}

impl From<tokio::time::error::Elapsed> for PublishError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        PublishError::AckTimeout
    }
}
