use super::define::{MessageData, MessageTypeId};
use super::error::MessageError;
use crate::chunk::Chunk;
use crate::command_messages::read_command;
use crate::protocol_control_messages::{
    read_acknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::user_control_messages::read_user_control_message;

impl<'a> MessageData<'a> {
    /// Classifies a reassembled chunk by message type and parses it just far
    /// enough to dispatch on. Unknown message types are not an error here:
    /// the deframer's caller is expected to log and skip them non-fatally.
    pub fn parse(chunk: &'a Chunk) -> Result<Option<MessageData<'a>>, MessageError> {
        match chunk.message_header.msg_type_id {
            MessageTypeId::SetChunkSize => Ok(Some(MessageData::SetChunkSize(ProtocolControlMessageSetChunkSize::read(
                &chunk.payload,
            )?))),
            MessageTypeId::WindowAcknowledgementSize => Ok(Some(MessageData::WindowAckSize(
                ProtocolControlMessageWindowAcknowledgementSize::read(&chunk.payload)?,
            ))),
            MessageTypeId::SetPeerBandwidth => Ok(Some(MessageData::SetPeerBandwidth(ProtocolControlMessageSetPeerBandwidth::read(
                &chunk.payload,
            )?))),
            MessageTypeId::Acknowledgement => Ok(Some(MessageData::Acknowledgement {
                sequence_number: read_acknowledgement(&chunk.payload)?,
            })),
            MessageTypeId::UserControlEvent => Ok(Some(MessageData::UserControl(read_user_control_message(&chunk.payload)?))),
            MessageTypeId::CommandAmf0 => Ok(Some(MessageData::Command(read_command(&chunk.payload)?))),
            MessageTypeId::Abort | MessageTypeId::Audio | MessageTypeId::Video | MessageTypeId::DataAmf0 | MessageTypeId::Aggregate => Ok(None),
        }
    }
}
