use bytes::Bytes;

use crate::messages::MessageTypeId;

// chunk stream ids used by this publisher

pub const CONTROL_CHUNK_STREAM_ID: u32 = 2;
pub const AUDIO_CHUNK_STREAM_ID: u32 = 8;
pub const VIDEO_CHUNK_STREAM_ID: u32 = 9;
pub const DATA_CHUNK_STREAM_ID: u32 = 18;

/// Valid chunk-stream ID range for this publisher. The 1-byte and 2-byte
/// extended basic-header forms (fmt's stream-id field of 0 or 1) are not
/// implemented, so IDs outside this inclusive range are rejected.
pub const MIN_CHUNK_STREAM_ID: u32 = 2;
pub const MAX_CHUNK_STREAM_ID: u32 = 63;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
/// A chunk type represents the format of the chunk header.
pub enum ChunkType {
    /// Chunk type 0 - 5.3.1.2.1
    Type0 = 0,
    /// Chunk type 1 - 5.3.1.2.2
    Type1 = 1,
    /// Chunk type 2 - 5.3.1.2.3
    Type2 = 2,
    /// Chunk type 3 - 5.3.1.1.4
    Type3 = 3,
}

impl ChunkType {
    pub(crate) fn from_fmt_bits(bits: u8) -> Self {
        match bits {
            0 => ChunkType::Type0,
            1 => ChunkType::Type1,
            2 => ChunkType::Type2,
            _ => ChunkType::Type3,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
/// A chunk basic header.
pub struct ChunkBasicHeader {
    pub format: ChunkType,
    pub chunk_stream_id: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
/// A chunk message header.
pub struct ChunkMessageHeader {
    /// Timestamp in milliseconds. RTMP's extended-timestamp word for
    /// values >= 0xFFFFFF is not implemented by this publisher (see
    /// design notes): timestamps are truncated to 24 bits on write, so a
    /// stream running long enough to overflow will report wrapped
    /// timestamps rather than failing.
    pub timestamp: u32,
    pub msg_length: u32,
    pub msg_type_id: MessageTypeId,
    pub msg_stream_id: u32,
}

/// A chunk: the wire unit a [`Message`](crate::messages::MessageData) gets
/// split into (or reassembled from).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Chunk {
    pub basic_header: ChunkBasicHeader,
    pub message_header: ChunkMessageHeader,
    pub payload: Bytes,
}

impl Chunk {
    /// Helper to build a type-0 chunk carrying a whole message's worth of
    /// payload; the writer splits it into continuation chunks as needed.
    pub fn new(chunk_stream_id: u32, timestamp: u32, msg_type_id: MessageTypeId, msg_stream_id: u32, payload: Bytes) -> Self {
        Self {
            basic_header: ChunkBasicHeader {
                chunk_stream_id,
                format: ChunkType::Type0,
            },
            message_header: ChunkMessageHeader {
                timestamp,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id,
            },
            payload,
        }
    }
}

/// This publisher announces an outbound chunk size of 4096 bytes via
/// SET_CHUNK_SIZE right after the handshake, instead of the RTMP default
/// of 128, to cut per-chunk overhead for video frames.
pub const OUTBOUND_CHUNK_SIZE: usize = 4096;

/// The default chunk size is 128 bytes (5.4.1) until SET_CHUNK_SIZE says
/// otherwise, applying independently to each direction.
pub const DEFAULT_CHUNK_SIZE: usize = 128;
