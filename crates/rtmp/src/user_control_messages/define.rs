#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u16)]
/// User control event types this publisher recognizes.
pub enum EventType {
    StreamBegin = 0,
    StreamEof = 1,
    StreamDry = 2,
    SetBufferLength = 3,
    StreamIsRecorded = 4,
    PingRequest = 6,
    PingResponse = 7,
}

impl EventType {
    pub(crate) fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::StreamBegin),
            1 => Some(Self::StreamEof),
            2 => Some(Self::StreamDry),
            3 => Some(Self::SetBufferLength),
            4 => Some(Self::StreamIsRecorded),
            6 => Some(Self::PingRequest),
            7 => Some(Self::PingResponse),
            _ => None,
        }
    }
}

/// A parsed user control (event) message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum UserControlMessage {
    StreamBegin { stream_id: u32 },
    StreamEof { stream_id: u32 },
    StreamDry { stream_id: u32 },
    SetBufferLength { stream_id: u32, buffer_length_ms: u32 },
    StreamIsRecorded { stream_id: u32 },
    PingRequest { timestamp: u32 },
    /// An event type this publisher doesn't act on (e.g. an echoed
    /// PING_RESPONSE); carried for observability/logging only.
    Unknown { event_type: u16 },
}
