//! The deframer / dispatch loop: a single-threaded task that reads
//! one complete message at a time off the transport and turns it into a
//! [`ReaderEvent`] for the session actor. Command interpretation ("which
//! `_result`/`onStatus` is this") lives here rather than in the actor,
//! since it only needs the wire payload, not session state.

use bytes::BytesMut;
use rtmp_amf0::Amf0Value;
use tokio::sync::mpsc;

use super::events::ReaderEvent;
use crate::chunk::ChunkDecoder;
use crate::command_messages::{CONNECT_TRANSACTION_ID, CREATE_STREAM_TRANSACTION_ID, ParsedCommand};
use crate::error::PublishError;
use crate::messages::MessageData;
use crate::transport::TransportReader;

/// Read size per socket call; chosen generously enough that one read
/// usually carries a whole video chunk at 4096-byte `chunk_size_out`.
const READ_CHUNK: usize = 8192;

pub async fn run_reader(mut transport: TransportReader, ack_window_in_default: u32, events: mpsc::UnboundedSender<ReaderEvent>) {
    let mut decoder = ChunkDecoder::default();
    let mut buf = BytesMut::new();
    let mut ack_window_in = ack_window_in_default;
    let mut bytes_read_total: u32 = 0;
    let mut bytes_since_ack: u32 = 0;
    let mut read_buf = vec![0u8; READ_CHUNK];

    loop {
        match transport.read(&mut read_buf).await {
            Ok(0) => {
                let _ = events.send(ReaderEvent::TransportClosed);
                return;
            }
            Ok(n) => buf.extend_from_slice(&read_buf[..n]),
            Err(err) => {
                let _ = events.send(ReaderEvent::ReaderError(PublishError::from(err)));
                return;
            }
        }

        loop {
            let before = buf.len();
            let chunk = match decoder.read_chunk(&mut buf) {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    let _ = events.send(ReaderEvent::ReaderError(PublishError::from(err)));
                    return;
                }
            };
            let consumed = before - buf.len();
            bytes_read_total = bytes_read_total.wrapping_add(consumed as u32);
            bytes_since_ack = bytes_since_ack.wrapping_add(consumed as u32);

            let message = match MessageData::parse(&chunk) {
                Ok(message) => message,
                Err(err) => {
                    let _ = events.send(ReaderEvent::ReaderError(PublishError::from(err)));
                    return;
                }
            };

            if let Some(message) = message {
                if let Err(err) = dispatch(message, &mut decoder, &mut ack_window_in, &events) {
                    let _ = events.send(ReaderEvent::ReaderError(err));
                    return;
                }
            }

            if bytes_since_ack >= ack_window_in && ack_window_in > 0 {
                let _ = events.send(ReaderEvent::NeedAck(bytes_read_total));
                bytes_since_ack = 0;
            }
        }
    }
}

fn dispatch(
    message: MessageData<'_>,
    decoder: &mut ChunkDecoder,
    ack_window_in: &mut u32,
    events: &mpsc::UnboundedSender<ReaderEvent>,
) -> Result<(), PublishError> {
    match message {
        MessageData::SetChunkSize(msg) => {
            decoder.set_chunk_size(msg.chunk_size);
            let _ = events.send(ReaderEvent::OnSetChunkSize(msg.chunk_size));
        }
        MessageData::WindowAckSize(msg) => {
            *ack_window_in = msg.acknowledgement_window_size;
        }
        MessageData::SetPeerBandwidth(msg) => {
            let _ = events.send(ReaderEvent::SetPeerBandwidth(msg.acknowledgement_window_size, msg.limit_type));
        }
        MessageData::Acknowledgement { sequence_number } => {
            let _ = events.send(ReaderEvent::OnAck(sequence_number));
        }
        MessageData::UserControl(crate::user_control_messages::UserControlMessage::PingRequest { timestamp }) => {
            let _ = events.send(ReaderEvent::NeedPingResponse(timestamp));
        }
        MessageData::UserControl(_) => {}
        MessageData::Command(command) => dispatch_command(command, events)?,
    }
    Ok(())
}

fn dispatch_command(command: ParsedCommand<'_>, events: &mpsc::UnboundedSender<ReaderEvent>) -> Result<(), PublishError> {
    match command.command_name.as_ref() {
        "_result" if command.transaction_id == CONNECT_TRANSACTION_ID => {
            let info = command.first_other().ok_or_else(|| PublishError::Protocol("_result for connect missing information object".into()))?;
            let code = info
                .get("code")
                .and_then(Amf0Value::as_str)
                .ok_or_else(|| PublishError::Protocol("_result for connect missing information.code".into()))?;
            if code == "NetConnection.Connect.Success" {
                let _ = events.send(ReaderEvent::OnConnect);
            } else if code.starts_with("NetConnection.Connect") {
                return Err(PublishError::Server(code.to_string()));
            } else {
                return Err(PublishError::Protocol(format!("unexpected connect result code {code}")));
            }
        }
        "_result" if command.transaction_id == CREATE_STREAM_TRANSACTION_ID => {
            let stream_id = command
                .first_other()
                .and_then(Amf0Value::as_f64)
                .ok_or_else(|| PublishError::Protocol("_result for createStream missing the stream id".into()))?;
            let _ = events.send(ReaderEvent::OnStreamCreated(stream_id.trunc() as u32));
        }
        "onStatus" => {
            if command.transaction_id != 0.0 {
                return Err(PublishError::Protocol(format!(
                    "onStatus transaction id must be 0, got {}",
                    command.transaction_id
                )));
            }
            let info = command.first_other().ok_or_else(|| PublishError::Protocol("onStatus missing information object".into()))?;
            let code = info
                .get("code")
                .and_then(Amf0Value::as_str)
                .ok_or_else(|| PublishError::Protocol("onStatus missing info.code".into()))?;
            if code == "NetStream.Publish.Start" {
                let _ = events.send(ReaderEvent::OnPublish);
            } else if code.starts_with("NetStream.Publish") {
                return Err(PublishError::Server(code.to_string()));
            }
        }
        "_error" => {
            let detail = command
                .first_other()
                .and_then(|v| v.get("code"))
                .and_then(Amf0Value::as_str)
                .unwrap_or("_error")
                .to_string();
            return Err(PublishError::Server(detail));
        }
        _ => {
            tracing::trace!(command = %command.command_name, "ignoring unrecognized command while publishing");
        }
    }
    Ok(())
}
