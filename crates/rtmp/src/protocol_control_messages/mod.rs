mod define;
mod error;
mod reader;
mod writer;

pub use define::{
    ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth, ProtocolControlMessageSetPeerBandwidthLimitType,
    ProtocolControlMessageWindowAcknowledgementSize,
};
pub use error::ProtocolControlMessageError;
pub use reader::read_acknowledgement;
pub use writer::write_acknowledgement;
