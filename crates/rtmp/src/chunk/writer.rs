use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use byteorder::{BigEndian, WriteBytesExt};

use super::define::{CONTROL_CHUNK_STREAM_ID, Chunk, ChunkType, DEFAULT_CHUNK_SIZE, MAX_CHUNK_STREAM_ID, MIN_CHUNK_STREAM_ID};
use super::error::ChunkEncodeError;

#[derive(Clone, Copy)]
struct PreviousHeader {
    timestamp: u32,
    msg_stream_id: u32,
}

/// Serializes [`Chunk`]s onto a synchronous writer. Holds only the small
/// amount of per-chunk-stream state needed for delta/inherited headers;
/// interior mutability lets callers share one encoder behind a `&self`
/// (the single-writer invariant is enforced one layer up, by the framer).
pub struct ChunkEncoder {
    chunk_size: AtomicU32,
    previous_headers: Mutex<HashMap<u32, PreviousHeader>>,
}

impl Default for ChunkEncoder {
    fn default() -> Self {
        Self {
            chunk_size: AtomicU32::new(DEFAULT_CHUNK_SIZE as u32),
            previous_headers: Mutex::new(HashMap::new()),
        }
    }
}

impl ChunkEncoder {
    /// Applies after this publisher announces a new outbound chunk size via
    /// SET_CHUNK_SIZE; takes effect for every message encoded afterwards.
    pub fn set_chunk_size(&self, size: u32) {
        self.chunk_size.store(size, Ordering::Relaxed);
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size.load(Ordering::Relaxed) as usize
    }

    /// Writes a whole logical message, splitting it into as many physical
    /// chunks as `chunk_size` requires.
    ///
    /// Control/command messages (chunk-stream [`CONTROL_CHUNK_STREAM_ID`])
    /// are always small enough to fit a single chunk and are written with a
    /// type-0 header. Media chunk streams (audio/video/data) never use a
    /// type-0 header here: the leading chunk of a message is type 1 and any
    /// continuation chunks are type 3, matching this publisher's framer
    /// design, which treats the message-stream id on those chunk streams as
    /// fixed for the life of the session rather than re-deriving it through
    /// the chunk header on every message.
    pub fn write_chunk(&self, writer: &mut impl io::Write, chunk: Chunk) -> Result<(), ChunkEncodeError> {
        let csid = chunk.basic_header.chunk_stream_id;
        if !(MIN_CHUNK_STREAM_ID..=MAX_CHUNK_STREAM_ID).contains(&csid) {
            return Err(ChunkEncodeError::UnsupportedChunkStreamId(csid));
        }

        let chunk_size = self.chunk_size();
        let payload = chunk.payload;
        let timestamp = chunk.message_header.timestamp & 0x00FF_FFFF;
        let msg_type_id = chunk.message_header.msg_type_id;
        let msg_stream_id = chunk.message_header.msg_stream_id;
        let msg_length = payload.len() as u32;

        let mut previous = self.previous_headers.lock().unwrap();
        // Control/command messages always get a self-contained type-0
        // header. A media chunk stream's very first message also gets
        // type-0, to establish the message-stream id and initial
        // timestamp a later type-1 leading chunk inherits (e.g. an AVC
        // sequence header sent ahead of the NALUs that follow it); every
        // message after that on the same chunk stream uses type-1,
        // including the leading chunk of one that needs type-3
        // continuations.
        let leading_format = if csid == CONTROL_CHUNK_STREAM_ID || !previous.contains_key(&csid) {
            ChunkType::Type0
        } else {
            ChunkType::Type1
        };

        // Type 1 conveys a timestamp *delta* from the last message sent on
        // this chunk stream; with no prior message the delta is just the
        // timestamp itself (so a fresh stream's first frame reports 0 when
        // its caller passes in an initial timestamp of 0).
        let ts_field = match leading_format {
            ChunkType::Type0 => timestamp,
            _ => match previous.get(&csid) {
                Some(prev) => timestamp.wrapping_sub(prev.timestamp) & 0x00FF_FFFF,
                None => timestamp,
            },
        };

        Self::write_basic_header(writer, leading_format, csid)?;
        match leading_format {
            ChunkType::Type0 => {
                writer.write_u24::<BigEndian>(ts_field)?;
                writer.write_u24::<BigEndian>(msg_length)?;
                writer.write_u8(msg_type_id as u8)?;
                writer.write_u32::<byteorder::LittleEndian>(msg_stream_id)?;
            }
            _ => {
                writer.write_u24::<BigEndian>(ts_field)?;
                writer.write_u24::<BigEndian>(msg_length)?;
                writer.write_u8(msg_type_id as u8)?;
            }
        }

        let mut offset = 0usize;
        let first_len = payload.len().min(chunk_size);
        writer.write_all(&payload[offset..offset + first_len])?;
        offset += first_len;

        while offset < payload.len() {
            Self::write_basic_header(writer, ChunkType::Type3, csid)?;
            let len = (payload.len() - offset).min(chunk_size);
            writer.write_all(&payload[offset..offset + len])?;
            offset += len;
        }

        previous.insert(csid, PreviousHeader { timestamp, msg_stream_id });

        Ok(())
    }

    fn write_basic_header(writer: &mut impl io::Write, format: ChunkType, chunk_stream_id: u32) -> Result<(), ChunkEncodeError> {
        let byte = ((format as u8) << 6) | (chunk_stream_id as u8 & 0x3F);
        writer.write_u8(byte)?;
        Ok(())
    }
}
