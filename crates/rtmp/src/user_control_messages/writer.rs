use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::define::EventType;
use super::error::UserControlMessageError;
use crate::chunk::{CONTROL_CHUNK_STREAM_ID, Chunk, ChunkEncoder};
use crate::messages::MessageTypeId;

/// Replies to an inbound PING_REQUEST, echoing its timestamp, per 4.G
/// ("Inbound event handling" / `NeedPingResponse`).
pub fn write_ping_response(encoder: &ChunkEncoder, writer: &mut impl io::Write, timestamp: u32) -> Result<(), UserControlMessageError> {
    let mut data = Vec::new();
    data.write_u16::<BigEndian>(EventType::PingResponse as u16)?;
    data.write_u32::<BigEndian>(timestamp)?;

    encoder.write_chunk(
        writer,
        Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeId::UserControlEvent, 0, data.into()),
    )?;

    Ok(())
}
