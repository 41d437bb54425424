use std::io;

use bytes::Bytes;
use rtmp_amf0::{Amf0Encoder, Amf0Value};

use super::define::{CONNECT_TRANSACTION_ID, CREATE_STREAM_TRANSACTION_ID, ZERO_TRANSACTION_ID};
use super::error::CommandError;
use crate::chunk::{CONTROL_CHUNK_STREAM_ID, Chunk, ChunkEncoder};
use crate::messages::MessageTypeId;

fn write_command_chunk(
    encoder: &ChunkEncoder,
    writer: &mut impl io::Write,
    msg_stream_id: u32,
    payload: Vec<u8>,
) -> Result<(), CommandError> {
    encoder.write_chunk(
        writer,
        Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeId::CommandAmf0, msg_stream_id, Bytes::from(payload)),
    )?;
    Ok(())
}

/// Writes the AMF0 `connect` command, transaction id 1.
pub fn write_connect(
    encoder: &ChunkEncoder,
    writer: &mut impl io::Write,
    app: &str,
    tc_url: Option<&str>,
    page_url: Option<&str>,
) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "connect")?;
    Amf0Encoder::encode_number(&mut buf, CONNECT_TRANSACTION_ID)?;

    let mut pairs: Vec<(&str, Amf0Value)> = vec![("app", Amf0Value::String(app.into()))];
    if let Some(tc_url) = tc_url {
        pairs.push(("tcUrl", Amf0Value::String(tc_url.into())));
    }
    if let Some(page_url) = page_url {
        pairs.push(("pageUrl", Amf0Value::String(page_url.into())));
    }
    Amf0Encoder::encode_object(&mut buf, &pairs)?;

    write_command_chunk(encoder, writer, 0, buf)
}

/// Writes the AMF0 `createStream` command, transaction id 10 and a null
/// command object.
pub fn write_create_stream(encoder: &ChunkEncoder, writer: &mut impl io::Write) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "createStream")?;
    Amf0Encoder::encode_number(&mut buf, CREATE_STREAM_TRANSACTION_ID)?;
    Amf0Encoder::encode_null(&mut buf)?;

    write_command_chunk(encoder, writer, 0, buf)
}

/// Writes the AMF0 `publish(playpath, "live")` command, transaction id 0,
/// on the given message stream.
pub fn write_publish(encoder: &ChunkEncoder, writer: &mut impl io::Write, msg_stream_id: u32, playpath: &str) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "publish")?;
    Amf0Encoder::encode_number(&mut buf, ZERO_TRANSACTION_ID)?;
    Amf0Encoder::encode_null(&mut buf)?;
    Amf0Encoder::encode_string(&mut buf, playpath)?;
    Amf0Encoder::encode_string(&mut buf, "live")?;

    write_command_chunk(encoder, writer, msg_stream_id, buf)
}

/// Writes the AMF0 `deleteStream(stream_id)` command.
pub fn write_delete_stream(encoder: &ChunkEncoder, writer: &mut impl io::Write, msg_stream_id: u32, stream_id: f64) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "deleteStream")?;
    Amf0Encoder::encode_number(&mut buf, ZERO_TRANSACTION_ID)?;
    Amf0Encoder::encode_null(&mut buf)?;
    Amf0Encoder::encode_number(&mut buf, stream_id)?;

    write_command_chunk(encoder, writer, msg_stream_id, buf)
}

/// Writes the `onTextData` AMF0 envelope used by `sendMetaData`: just the
/// handler name and its ECMA array, with no `@setDataFrame` prefix.
pub fn write_text_data(encoder: &ChunkEncoder, writer: &mut impl io::Write, msg_stream_id: u32, text: &str) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "onTextData")?;
    Amf0Encoder::encode_ecma_array(&mut buf, &[("text", Amf0Value::String(text.into()))])?;

    encoder.write_chunk(
        writer,
        Chunk::new(crate::chunk::DATA_CHUNK_STREAM_ID, 0, MessageTypeId::DataAmf0, msg_stream_id, Bytes::from(buf)),
    )?;
    Ok(())
}

/// Writes the `@setDataFrame`/`onMetaData` or `onTextData` AMF0 envelope
/// used by `sendDataFrame`/`sendMetaData`, on the data chunk stream.
pub fn write_data_frame(
    encoder: &ChunkEncoder,
    writer: &mut impl io::Write,
    msg_stream_id: u32,
    handler_name: &str,
    pairs: &[(&str, Amf0Value)],
) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    Amf0Encoder::encode_string(&mut buf, "@setDataFrame")?;
    Amf0Encoder::encode_string(&mut buf, handler_name)?;
    Amf0Encoder::encode_ecma_array(&mut buf, pairs)?;

    encoder.write_chunk(
        writer,
        Chunk::new(crate::chunk::DATA_CHUNK_STREAM_ID, 0, MessageTypeId::DataAmf0, msg_stream_id, Bytes::from(buf)),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::chunk::ChunkDecoder;

    #[test]
    fn test_write_connect() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        write_connect(&encoder, &mut (&mut buf).writer(), "live", Some("rtmp://host/live"), None).unwrap();

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().expect("chunk");
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeId::CommandAmf0);
        assert_eq!(chunk.basic_header.chunk_stream_id, CONTROL_CHUNK_STREAM_ID);
    }

    #[test]
    fn test_write_publish_uses_given_message_stream_id() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();

        write_publish(&encoder, &mut (&mut buf).writer(), 1, "cam").unwrap();

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().expect("chunk");
        assert_eq!(chunk.message_header.msg_stream_id, 1);
    }
}
