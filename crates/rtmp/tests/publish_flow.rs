//! End-to-end integration test for the publishing controller: drives a
//! real [`PublishingController`] against a hand-rolled fake RTMP server
//! over a loopback TCP connection, covering the simple handshake,
//! `connect`/`createStream`/`publish`, and one each of video, audio, and
//! metadata frames through to `deleteStream`/`stop`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use rtmp_aac::AacHeader;
use rtmp_amf0::{Amf0Encoder, Amf0Value};
use rtmp_publish::chunk::{Chunk, ChunkDecoder, ChunkEncoder, CONTROL_CHUNK_STREAM_ID};
use rtmp_publish::media::{AacFrame, H264Frame, RtmpDataFrame};
use rtmp_publish::messages::{MessageData, MessageTypeId};
use rtmp_publish::{NoopListener, PublishError, PublisherEventListener, PublishingController, RtmpPublisherConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

struct TestListener {
    connected: Arc<Notify>,
    ready_to_publish: Arc<Notify>,
    error: Mutex<Option<String>>,
}

impl PublisherEventListener for TestListener {
    fn on_connected(&self) {
        self.connected.notify_one();
    }

    fn on_ready_to_publish(&self) {
        self.ready_to_publish.notify_one();
    }

    fn on_connection_error(&self, err: &PublishError) {
        *self.error.lock().unwrap() = Some(err.to_string());
    }
}

fn annex_b_sps_pps() -> Vec<u8> {
    let sps = [0x67, 0x42, 0x00, 0x1e, 0xab, 0xcd];
    let pps = [0x68, 0xce, 0x38, 0x80];
    let mut buf = vec![0x00, 0x00, 0x00, 0x01];
    buf.extend_from_slice(&sps);
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
    buf.extend_from_slice(&pps);
    buf
}

/// Reads bytes off `socket` until `decoder` can assemble a complete chunk,
/// mirroring the shape of `session::reader::run_reader`'s read loop.
async fn read_one_chunk(socket: &mut TcpStream, buf: &mut bytes::BytesMut, decoder: &mut ChunkDecoder) -> Chunk {
    loop {
        if let Some(chunk) = decoder.read_chunk(buf).expect("valid chunk framing") {
            return chunk;
        }
        let mut tmp = [0u8; 4096];
        let n = socket.read(&mut tmp).await.expect("socket read");
        assert!(n > 0, "fake server's peer closed the connection unexpectedly");
        buf.extend_from_slice(&tmp[..n]);
    }
}

/// Reads chunks until one is a COMMAND_AMF0 message, skipping any
/// protocol-control chatter (SET_CHUNK_SIZE / WINDOW_ACK_SIZE) that
/// precedes it, the same way a real server would. Returns the raw
/// (lifetime-free) [`Chunk`] rather than a parsed command so callers can
/// parse it and inspect the result in one scope, without a helper
/// function trying to hand back a value that borrows from a local.
async fn read_until_command(socket: &mut TcpStream, buf: &mut bytes::BytesMut, decoder: &mut ChunkDecoder) -> Chunk {
    loop {
        let chunk = read_one_chunk(socket, buf, decoder).await;
        if chunk.message_header.msg_type_id == MessageTypeId::CommandAmf0 {
            return chunk;
        }
    }
}

fn encode_command_reply(encoder: &ChunkEncoder, amf: Vec<u8>, msg_stream_id: u32) -> Vec<u8> {
    let mut out = Vec::new();
    encoder
        .write_chunk(&mut out, Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeId::CommandAmf0, msg_stream_id, Bytes::from(amf)))
        .unwrap();
    out
}

fn connect_success_reply(encoder: &ChunkEncoder) -> Vec<u8> {
    let mut amf = Vec::new();
    Amf0Encoder::encode_string(&mut amf, "_result").unwrap();
    Amf0Encoder::encode_number(&mut amf, 1.0).unwrap();
    Amf0Encoder::encode_null(&mut amf).unwrap();
    Amf0Encoder::encode_object(&mut amf, &[("code", Amf0Value::String("NetConnection.Connect.Success".into()))]).unwrap();
    encode_command_reply(encoder, amf, 0)
}

fn create_stream_reply(encoder: &ChunkEncoder, stream_id: f64) -> Vec<u8> {
    let mut amf = Vec::new();
    Amf0Encoder::encode_string(&mut amf, "_result").unwrap();
    Amf0Encoder::encode_number(&mut amf, 10.0).unwrap();
    Amf0Encoder::encode_null(&mut amf).unwrap();
    Amf0Encoder::encode_number(&mut amf, stream_id).unwrap();
    encode_command_reply(encoder, amf, 0)
}

fn publish_start_reply(encoder: &ChunkEncoder, stream_id: u32) -> Vec<u8> {
    let mut amf = Vec::new();
    Amf0Encoder::encode_string(&mut amf, "onStatus").unwrap();
    Amf0Encoder::encode_number(&mut amf, 0.0).unwrap();
    Amf0Encoder::encode_null(&mut amf).unwrap();
    Amf0Encoder::encode_object(&mut amf, &[("code", Amf0Value::String("NetStream.Publish.Start".into()))]).unwrap();
    encode_command_reply(encoder, amf, stream_id)
}

async fn perform_server_handshake(socket: &mut TcpStream) {
    let mut c0c1 = [0u8; 1537];
    socket.read_exact(&mut c0c1).await.unwrap();
    assert_eq!(c0c1[0], 0x03);

    let mut s0s1 = vec![0u8; 1537];
    s0s1[0] = 0x03;
    socket.write_all(&s0s1).await.unwrap();

    let mut c2 = [0u8; 1536];
    socket.read_exact(&mut c2).await.unwrap();

    let s2 = vec![0u8; 1536];
    socket.write_all(&s2).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn full_publish_session_against_a_scripted_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_server_handshake(&mut socket).await;

        let mut buf = bytes::BytesMut::new();
        let mut decoder = ChunkDecoder::default();
        let reply_encoder = ChunkEncoder::default();

        // SET_CHUNK_SIZE and WINDOW_ACK_SIZE precede `connect`.
        let set_chunk_size = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(set_chunk_size.message_header.msg_type_id, MessageTypeId::SetChunkSize);
        let window_ack = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(window_ack.message_header.msg_type_id, MessageTypeId::WindowAcknowledgementSize);

        let connect_chunk = read_until_command(&mut socket, &mut buf, &mut decoder).await;
        match MessageData::parse(&connect_chunk).unwrap().unwrap() {
            MessageData::Command(connect_cmd) => {
                assert_eq!(connect_cmd.command_name, "connect");
                assert_eq!(connect_cmd.command_object.get("app"), Some(&Amf0Value::String("live".into())));
            }
            _ => unreachable!("read_until_command only returns COMMAND_AMF0 chunks"),
        }
        socket.write_all(&connect_success_reply(&reply_encoder)).await.unwrap();

        let create_stream_chunk = read_until_command(&mut socket, &mut buf, &mut decoder).await;
        match MessageData::parse(&create_stream_chunk).unwrap().unwrap() {
            MessageData::Command(create_stream_cmd) => assert_eq!(create_stream_cmd.command_name, "createStream"),
            _ => unreachable!("read_until_command only returns COMMAND_AMF0 chunks"),
        }
        socket.write_all(&create_stream_reply(&reply_encoder, 1.0)).await.unwrap();

        let publish_chunk = read_until_command(&mut socket, &mut buf, &mut decoder).await;
        match MessageData::parse(&publish_chunk).unwrap().unwrap() {
            MessageData::Command(publish_cmd) => {
                assert_eq!(publish_cmd.command_name, "publish");
                assert_eq!(publish_cmd.others.first(), Some(&Amf0Value::String("cam".into())));
                assert_eq!(publish_cmd.others.get(1), Some(&Amf0Value::String("live".into())));
            }
            _ => unreachable!("read_until_command only returns COMMAND_AMF0 chunks"),
        }
        socket.write_all(&publish_start_reply(&reply_encoder, 1)).await.unwrap();

        // AVC sequence header, on the video chunk stream.
        let seq_header = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(seq_header.message_header.msg_type_id, MessageTypeId::Video);
        assert_eq!(&seq_header.payload[..5], &[0x17, 0x00, 0x00, 0x00, 0x00]);

        // Keyframe NALU.
        let nalu = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(nalu.message_header.msg_type_id, MessageTypeId::Video);
        assert_eq!(nalu.payload[0], 0x17);
        assert_eq!(nalu.payload[1], 0x01);

        // AAC sequence header, then one raw AAC frame.
        let aac_header_msg = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(aac_header_msg.message_header.msg_type_id, MessageTypeId::Audio);
        assert_eq!(aac_header_msg.payload[1], 0x00);

        let aac_raw_msg = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(aac_raw_msg.message_header.msg_type_id, MessageTypeId::Audio);
        assert_eq!(aac_raw_msg.payload[1], 0x01);

        // onMetaData data frame.
        let data_frame = read_one_chunk(&mut socket, &mut buf, &mut decoder).await;
        assert_eq!(data_frame.message_header.msg_type_id, MessageTypeId::DataAmf0);

        let delete_stream_chunk = read_until_command(&mut socket, &mut buf, &mut decoder).await;
        match MessageData::parse(&delete_stream_chunk).unwrap().unwrap() {
            MessageData::Command(delete_stream_cmd) => assert_eq!(delete_stream_cmd.command_name, "deleteStream"),
            _ => unreachable!("read_until_command only returns COMMAND_AMF0 chunks"),
        }
    });

    let config = RtmpPublisherConfig::new(addr.ip().to_string(), addr.port())
        .with_connect_timeout(Duration::from_secs(2))
        .with_handshake_timeout(Duration::from_secs(2))
        .with_write_timeout(Duration::from_secs(2))
        .with_ack_wait_timeout(Duration::from_secs(2));
    let controller = PublishingController::new(config);

    let listener = Arc::new(TestListener {
        connected: Arc::new(Notify::new()),
        ready_to_publish: Arc::new(Notify::new()),
        error: Mutex::new(None),
    });

    controller.start(listener.clone(), "live", Some("rtmp://127.0.0.1/live".to_string()), None).await.unwrap();
    listener.connected.notified().await;
    assert!(controller.is_started());

    controller.create_stream("cam").await.unwrap();
    listener.ready_to_publish.notified().await;

    controller.set_audio_header(AacHeader::parse(vec![0x12, 0x10]).unwrap()).await.unwrap();

    controller
        .post_video(H264Frame::sequence_header(0, annex_b_sps_pps()))
        .await
        .unwrap();
    controller.post_video(H264Frame::nalu(33, true, vec![0x65, 0xAA, 0xBB])).await.unwrap();

    controller
        .post_audio(AacFrame { timestamp_ms: 0, payload: Bytes::from_static(&[0xAB, 0xCD, 0xEF]) })
        .await
        .unwrap();

    controller
        .send_data_frame(RtmpDataFrame {
            width: 1280,
            height: 720,
            framerate: 30,
            audiosamplerate: 44100,
            videocodecid: 7,
            audiocodecid: 10,
        })
        .await
        .unwrap();

    controller.delete_stream().await.unwrap();

    server.await.unwrap();

    assert!(listener.error.lock().unwrap().is_none());

    controller.stop().await.unwrap();
    assert!(!controller.is_started());
}

#[tokio::test]
async fn reentrant_call_while_one_is_in_flight_observes_busy() {
    // A `start` against a port nothing listens on will hang in `connect`
    // long enough for a concurrent call to observe `Busy` (single-writer
    // invariant, 4.D/4.G): bind and immediately drop the listener so the
    // connect attempt blocks on a SYN that is never ack'd instead of
    // failing fast with connection-refused.
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let config = RtmpPublisherConfig::new(addr.ip().to_string(), addr.port()).with_connect_timeout(Duration::from_secs(5));
    let controller = PublishingController::new(config);
    let listener: Arc<dyn PublisherEventListener> = Arc::new(NoopListener);

    let c2 = controller.clone();
    let l2 = listener.clone();
    let first = tokio::spawn(async move { c2.start(l2, "live", None, None).await });

    // Give the first call's `try_send` a chance to land before the second.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = controller.start(listener, "live", None, None).await;
    assert!(matches!(second, Err(PublishError::Busy)));

    first.abort();
}
