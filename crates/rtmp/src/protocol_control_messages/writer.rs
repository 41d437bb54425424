use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;

use super::define::{
    ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth, ProtocolControlMessageWindowAcknowledgementSize,
};
use super::error::ProtocolControlMessageError;
use crate::chunk::{CONTROL_CHUNK_STREAM_ID, Chunk, ChunkEncoder};
use crate::messages::MessageTypeId;

impl ProtocolControlMessageSetChunkSize {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl io::Write) -> Result<(), ProtocolControlMessageError> {
        // The top bit is reserved and must be 0 (31-bit value).
        let chunk_size = self.chunk_size & 0x7FFF_FFFF;

        encoder.write_chunk(
            writer,
            Chunk::new(
                CONTROL_CHUNK_STREAM_ID,
                0,
                MessageTypeId::SetChunkSize,
                0,
                Bytes::from(chunk_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl io::Write) -> Result<(), ProtocolControlMessageError> {
        encoder.write_chunk(
            writer,
            Chunk::new(
                CONTROL_CHUNK_STREAM_ID,
                0,
                MessageTypeId::WindowAcknowledgementSize,
                0,
                Bytes::from(self.acknowledgement_window_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageSetPeerBandwidth {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl io::Write) -> Result<(), ProtocolControlMessageError> {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(self.acknowledgement_window_size)?;
        data.write_u8(self.limit_type as u8)?;

        encoder.write_chunk(
            writer,
            Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeId::SetPeerBandwidth, 0, Bytes::from(data)),
        )?;

        Ok(())
    }
}

/// Writes an ACK (message type 3) reporting total bytes read so far.
pub fn write_acknowledgement(encoder: &ChunkEncoder, writer: &mut impl io::Write, sequence_number: u32) -> Result<(), ProtocolControlMessageError> {
    encoder.write_chunk(
        writer,
        Chunk::new(
            CONTROL_CHUNK_STREAM_ID,
            0,
            MessageTypeId::Acknowledgement,
            0,
            Bytes::from(sequence_number.to_be_bytes().to_vec()),
        ),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::chunk::ChunkDecoder;
    use crate::protocol_control_messages::ProtocolControlMessageSetPeerBandwidthLimitType;

    #[test]
    fn test_writer_write_set_chunk_size() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        ProtocolControlMessageSetChunkSize { chunk_size: 1 }
            .write(&encoder, &mut (&mut buf).writer())
            .unwrap();

        let mut decoder = ChunkDecoder::default();

        let chunk = decoder.read_chunk(&mut buf).expect("read chunk").expect("chunk");
        assert_eq!(chunk.basic_header.chunk_stream_id, 0x02);
        assert_eq!(chunk.message_header.msg_type_id as u8, 0x01);
        assert_eq!(chunk.message_header.msg_stream_id, 0);
        assert_eq!(chunk.payload, vec![0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_writer_window_acknowledgement_size() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        ProtocolControlMessageWindowAcknowledgementSize {
            acknowledgement_window_size: 1,
        }
        .write(&encoder, &mut (&mut buf).writer())
        .unwrap();

        let mut decoder = ChunkDecoder::default();

        let chunk = decoder.read_chunk(&mut buf).expect("read chunk").expect("chunk");
        assert_eq!(chunk.basic_header.chunk_stream_id, 0x02);
        assert_eq!(chunk.message_header.msg_type_id as u8, 0x05);
        assert_eq!(chunk.message_header.msg_stream_id, 0);
        assert_eq!(chunk.payload, vec![0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_writer_set_peer_bandwidth() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        ProtocolControlMessageSetPeerBandwidth {
            acknowledgement_window_size: 1,
            limit_type: ProtocolControlMessageSetPeerBandwidthLimitType::Dynamic,
        }
        .write(&encoder, &mut (&mut buf).writer())
        .unwrap();

        let mut decoder = ChunkDecoder::default();

        let chunk = decoder.read_chunk(&mut buf).expect("read chunk").expect("chunk");
        assert_eq!(chunk.basic_header.chunk_stream_id, 0x02);
        assert_eq!(chunk.message_header.msg_type_id as u8, 0x06);
        assert_eq!(chunk.message_header.msg_stream_id, 0);
        assert_eq!(chunk.payload, vec![0x00, 0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_writer_acknowledgement() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        write_acknowledgement(&encoder, &mut (&mut buf).writer(), 0x1234).unwrap();

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).expect("read chunk").expect("chunk");
        assert_eq!(chunk.message_header.msg_type_id as u8, 0x03);
        assert_eq!(chunk.payload, vec![0x00, 0x00, 0x12, 0x34]);
    }
}
