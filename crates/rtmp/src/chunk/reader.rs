use std::collections::HashMap;

use bytes::{Buf, BytesMut};

use super::define::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType, DEFAULT_CHUNK_SIZE, MAX_CHUNK_STREAM_ID, MIN_CHUNK_STREAM_ID};
use super::error::ChunkDecodeError;
use crate::messages::MessageTypeId;
use rtmp_bytes_util::BytesCursorExt;

#[derive(Clone, Copy)]
struct StoredHeader {
    timestamp: u32,
    msg_length: u32,
    msg_type_id: MessageTypeId,
    msg_stream_id: u32,
}

/// Reassembles logical [`Chunk`]s (complete message payloads) out of a
/// stream of physical RTMP chunks. Bytes are only ever consumed from `buf`
/// once a full physical chunk (header + its share of the payload) is
/// present; short reads leave `buf` untouched so the caller can append more
/// bytes from the socket and call again (see `chunk::define`'s module docs).
pub struct ChunkDecoder {
    chunk_size_in: u32,
    stream_headers: HashMap<u32, StoredHeader>,
    partial_payloads: HashMap<u32, BytesMut>,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self {
            chunk_size_in: DEFAULT_CHUNK_SIZE as u32,
            stream_headers: HashMap::new(),
            partial_payloads: HashMap::new(),
        }
    }
}

impl ChunkDecoder {
    /// Applies when a peer's SET_CHUNK_SIZE message is received.
    pub fn set_chunk_size(&mut self, size: u32) {
        self.chunk_size_in = size;
    }

    /// Attempts to read one complete logical message from `buf`. Returns
    /// `Ok(None)` when not enough bytes are buffered yet; `buf` is never
    /// partially consumed in that case.
    pub fn read_chunk(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, ChunkDecodeError> {
        loop {
            let mut cursor: &[u8] = &buf[..];

            let Some(basic_byte) = cursor.try_get_u8() else {
                return Ok(None);
            };
            let fmt_bits = basic_byte >> 6;
            let csid = (basic_byte & 0x3F) as u32;
            if !(MIN_CHUNK_STREAM_ID..=MAX_CHUNK_STREAM_ID).contains(&csid) {
                return Err(ChunkDecodeError::UnsupportedChunkStreamId(csid));
            }
            let format = ChunkType::from_fmt_bits(fmt_bits);

            let header = match format {
                ChunkType::Type0 => {
                    let Some(timestamp) = cursor.try_get_u24() else { return Ok(None) };
                    let Some(msg_length) = cursor.try_get_u24() else { return Ok(None) };
                    let Some(type_byte) = cursor.try_get_u8() else { return Ok(None) };
                    let Some(msg_stream_id) = cursor.try_get_u32_le() else { return Ok(None) };
                    let msg_type_id = MessageTypeId::from_byte(type_byte).ok_or(ChunkDecodeError::UnknownMessageTypeId(type_byte))?;
                    StoredHeader {
                        timestamp,
                        msg_length,
                        msg_type_id,
                        msg_stream_id,
                    }
                }
                ChunkType::Type1 => {
                    let Some(delta) = cursor.try_get_u24() else { return Ok(None) };
                    let Some(msg_length) = cursor.try_get_u24() else { return Ok(None) };
                    let Some(type_byte) = cursor.try_get_u8() else { return Ok(None) };
                    let prev = self.stream_headers.get(&csid).ok_or(ChunkDecodeError::MissingPriorHeader)?;
                    let msg_type_id = MessageTypeId::from_byte(type_byte).ok_or(ChunkDecodeError::UnknownMessageTypeId(type_byte))?;
                    StoredHeader {
                        timestamp: prev.timestamp.wrapping_add(delta) & 0x00FF_FFFF,
                        msg_length,
                        msg_type_id,
                        msg_stream_id: prev.msg_stream_id,
                    }
                }
                ChunkType::Type2 => {
                    let Some(delta) = cursor.try_get_u24() else { return Ok(None) };
                    let prev = self.stream_headers.get(&csid).ok_or(ChunkDecodeError::MissingPriorHeader)?;
                    StoredHeader {
                        timestamp: prev.timestamp.wrapping_add(delta) & 0x00FF_FFFF,
                        msg_length: prev.msg_length,
                        msg_type_id: prev.msg_type_id,
                        msg_stream_id: prev.msg_stream_id,
                    }
                }
                ChunkType::Type3 => {
                    let prev = self.stream_headers.get(&csid).ok_or(ChunkDecodeError::MissingPriorHeader)?;
                    *prev
                }
            };

            let already_read = self.partial_payloads.get(&csid).map(|b| b.len()).unwrap_or(0);
            let remaining_for_message = header.msg_length as usize - already_read;
            let this_chunk_len = remaining_for_message.min(self.chunk_size_in as usize);

            if cursor.remaining() < this_chunk_len {
                return Ok(None);
            }
            let Some(payload_slice) = cursor.try_copy_to_bytes(this_chunk_len) else {
                return Ok(None);
            };

            let consumed = buf.len() - cursor.remaining();
            buf.advance(consumed);

            self.stream_headers.insert(csid, header);
            let accumulator = self.partial_payloads.entry(csid).or_default();
            accumulator.extend_from_slice(&payload_slice);

            if accumulator.len() == header.msg_length as usize {
                let payload = self.partial_payloads.remove(&csid).unwrap().freeze();
                return Ok(Some(Chunk {
                    basic_header: ChunkBasicHeader { format, chunk_stream_id: csid },
                    message_header: ChunkMessageHeader {
                        timestamp: header.timestamp,
                        msg_length: header.msg_length,
                        msg_type_id: header.msg_type_id,
                        msg_stream_id: header.msg_stream_id,
                    },
                    payload,
                }));
            }
            // Message not yet complete: loop to read the next physical
            // chunk, which may belong to this or another chunk stream.
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, Bytes};

    use super::*;
    use crate::chunk::writer::ChunkEncoder;
    use crate::chunk::{Chunk, VIDEO_CHUNK_STREAM_ID};

    #[test]
    fn partial_header_does_not_consume_buffer() {
        let mut decoder = ChunkDecoder::default();
        let mut buf = BytesMut::from(&[0x02, 0x00][..]);
        assert_eq!(decoder.read_chunk(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn round_trips_a_single_chunk_message() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        encoder
            .write_chunk(
                &mut (&mut buf).writer(),
                Chunk::new(crate::chunk::CONTROL_CHUNK_STREAM_ID, 0, MessageTypeId::SetChunkSize, 0, Bytes::from_static(&[0, 0, 0x10, 0])),
            )
            .unwrap();

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().expect("chunk");
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeId::SetChunkSize);
        assert_eq!(chunk.payload, Bytes::from_static(&[0, 0, 0x10, 0]));
        assert!(buf.is_empty());
    }

    #[test]
    fn reassembles_a_split_media_message() {
        let encoder = ChunkEncoder::default();
        encoder.set_chunk_size(16);
        let mut buf = BytesMut::new();
        let payload = Bytes::from(vec![0x7Au8; 40]);
        encoder
            .write_chunk(&mut (&mut buf).writer(), Chunk::new(VIDEO_CHUNK_STREAM_ID, 0, MessageTypeId::Video, 1, payload.clone()))
            .unwrap();

        let mut decoder = ChunkDecoder::default();
        decoder.set_chunk_size(16);
        let chunk = decoder.read_chunk(&mut buf).unwrap().expect("chunk");
        assert_eq!(chunk.payload, payload);
        assert!(buf.is_empty());
    }
}
