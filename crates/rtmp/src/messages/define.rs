use crate::command_messages::ParsedCommand;
use crate::protocol_control_messages::{
    ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::user_control_messages::UserControlMessage;

/// A chunk's payload, classified by message type and parsed just far enough
/// for the reader task to dispatch on. Interpreting `Command` further
/// (matching on command name / transaction id) is the publishing
/// controller's job, since that interpretation depends on session state.
#[derive(Debug)]
pub enum MessageData<'a> {
    SetChunkSize(ProtocolControlMessageSetChunkSize),
    WindowAckSize(ProtocolControlMessageWindowAcknowledgementSize),
    SetPeerBandwidth(ProtocolControlMessageSetPeerBandwidth),
    Acknowledgement { sequence_number: u32 },
    UserControl(UserControlMessage),
    Command(ParsedCommand<'a>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
/// RTMP message type IDs this publisher knows about. Values observed on
/// the wire that are not in this list are skipped by the deframer rather
/// than rejected.
pub enum MessageTypeId {
    SetChunkSize = 1,
    Abort = 2,
    Acknowledgement = 3,
    UserControlEvent = 4,
    WindowAcknowledgementSize = 5,
    SetPeerBandwidth = 6,
    Audio = 8,
    Video = 9,
    DataAmf0 = 18,
    CommandAmf0 = 20,
    Aggregate = 22,
}

impl MessageTypeId {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::SetChunkSize),
            2 => Some(Self::Abort),
            3 => Some(Self::Acknowledgement),
            4 => Some(Self::UserControlEvent),
            5 => Some(Self::WindowAcknowledgementSize),
            6 => Some(Self::SetPeerBandwidth),
            8 => Some(Self::Audio),
            9 => Some(Self::Video),
            18 => Some(Self::DataAmf0),
            20 => Some(Self::CommandAmf0),
            22 => Some(Self::Aggregate),
            _ => None,
        }
    }
}
