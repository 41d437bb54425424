//! The publishing controller: a single actor task owns the transport
//! writer, the chunk encoder, and every piece of session state, so the
//! single-writer invariant falls out of serialized command processing
//! instead of a CAS-guarded flag. Reader-raised events and application
//! calls are both just messages the same loop drains, one at a time,
//! which avoids a race between an inbound PING and an outbound media
//! write that a separate atomic guard would need to account for.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use rtmp_amf0::Amf0Value;
use rtmp_future_ext::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::events::ReaderEvent;
use super::reader::run_reader;
use super::state::SessionState;
use crate::chunk::{AUDIO_CHUNK_STREAM_ID, Chunk, ChunkEncoder, VIDEO_CHUNK_STREAM_ID};
use crate::command_messages::{write_connect, write_create_stream, write_data_frame, write_delete_stream, write_publish, write_text_data};
use crate::config::{DEFAULT_ACK_WINDOW, RtmpPublisherConfig};
use crate::error::PublishError;
use crate::flv;
use crate::handshake::perform_handshake;
use crate::listener::{NoopListener, PublisherEventListener};
use crate::media::{AacFrame, H264Frame, RtmpDataFrame};
use crate::messages::MessageTypeId;
use crate::protocol_control_messages::{
    ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidthLimitType, ProtocolControlMessageWindowAcknowledgementSize,
    write_acknowledgement,
};
use crate::transport::{Transport, TransportError, TransportWriter};
use crate::user_control_messages::write_ping_response;
use rtmp_aac::AacHeader;

type Reply = oneshot::Sender<Result<(), PublishError>>;

enum Command {
    Start {
        listener: Arc<dyn PublisherEventListener>,
        app: String,
        server_url: Option<String>,
        page_url: Option<String>,
        reply: Reply,
    },
    CreateStream {
        playpath: String,
        reply: Reply,
    },
    SetAudioHeader {
        header: AacHeader,
        reply: Reply,
    },
    PostVideo {
        frame: H264Frame,
        reply: Reply,
    },
    PostAudio {
        frame: AacFrame,
        reply: Reply,
    },
    SendMetaData {
        text: String,
        reply: Reply,
    },
    SendDataFrame {
        frame: RtmpDataFrame,
        reply: Reply,
    },
    DeleteStream {
        reply: Reply,
    },
    Stop {
        reply: Reply,
    },
}

/// The publishing client's public handle: a cheap, cloneable front
/// for the actor task. Every method round-trips through the bounded(1)
/// command channel, so a call made while another is in flight observes
/// `Busy` immediately instead of queueing behind it.
#[derive(Clone)]
pub struct PublishingController {
    cmd_tx: mpsc::Sender<Command>,
    started: Arc<AtomicBool>,
}

impl PublishingController {
    pub fn new(config: RtmpPublisherConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let started = Arc::new(AtomicBool::new(false));
        let inner = Inner::new(config, started.clone());
        tokio::spawn(inner.run(cmd_rx));
        Self { cmd_tx, started }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    async fn call(&self, make: impl FnOnce(Reply) -> Command) -> Result<(), PublishError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx.try_send(make(reply_tx)).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => PublishError::Busy,
            mpsc::error::TrySendError::Closed(_) => PublishError::Closed,
        })?;
        reply_rx.await.map_err(|_| PublishError::Closed)?
    }

    pub async fn start(
        &self,
        listener: Arc<dyn PublisherEventListener>,
        app: impl Into<String>,
        server_url: Option<String>,
        page_url: Option<String>,
    ) -> Result<(), PublishError> {
        let app = app.into();
        self.call(|reply| Command::Start { listener, app, server_url, page_url, reply }).await
    }

    pub async fn create_stream(&self, playpath: impl Into<String>) -> Result<(), PublishError> {
        let playpath = playpath.into();
        self.call(|reply| Command::CreateStream { playpath, reply }).await
    }

    pub async fn set_audio_header(&self, header: AacHeader) -> Result<(), PublishError> {
        self.call(|reply| Command::SetAudioHeader { header, reply }).await
    }

    pub async fn post_video(&self, frame: H264Frame) -> Result<(), PublishError> {
        self.call(|reply| Command::PostVideo { frame, reply }).await
    }

    pub async fn post_audio(&self, frame: AacFrame) -> Result<(), PublishError> {
        self.call(|reply| Command::PostAudio { frame, reply }).await
    }

    pub async fn send_meta_data(&self, text: impl Into<String>) -> Result<(), PublishError> {
        let text = text.into();
        self.call(|reply| Command::SendMetaData { text, reply }).await
    }

    pub async fn send_data_frame(&self, frame: RtmpDataFrame) -> Result<(), PublishError> {
        self.call(|reply| Command::SendDataFrame { frame, reply }).await
    }

    pub async fn delete_stream(&self) -> Result<(), PublishError> {
        self.call(|reply| Command::DeleteStream { reply }).await
    }

    pub async fn stop(&self) -> Result<(), PublishError> {
        self.call(|reply| Command::Stop { reply }).await
    }
}

struct Inner {
    state: SessionState,
    started_flag: Arc<AtomicBool>,
    config: RtmpPublisherConfig,
    listener: Arc<dyn PublisherEventListener>,

    chunk_encoder: ChunkEncoder,
    writer: Option<TransportWriter>,
    writer_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
    events_rx: Option<mpsc::UnboundedReceiver<ReaderEvent>>,

    app: String,
    server_url: Option<String>,
    page_url: Option<String>,
    playpath: Option<String>,
    stream_id: u32,

    ack_window_out: u32,
    bytes_sent_since_ack: u64,
    bytes_sent_total: u64,
    peer_bandwidth_limit_type: Option<ProtocolControlMessageSetPeerBandwidthLimitType>,

    pending_ack: Option<u32>,
    pending_ping: Option<u32>,

    aac_header: Option<AacHeader>,
    aac_sequence_sent: bool,

    // Last data-frame timestamp seen per media type, -1 meaning "none yet".
    // Sequence headers don't advance these; only VIDEODATA/AUDIODATA frames
    // do. `video_wire_ts`/
    // `audio_wire_ts` are the running totals handed to the chunk encoder,
    // kept in lockstep with the deltas computed here so the encoder's own
    // subtraction against its last-written header reproduces exactly the
    // delta this controller decided on, rather than the encoder diffing
    // against whatever absolute clock value the sequence header happened
    // to carry.
    last_video_ts: i64,
    last_audio_ts: i64,
    video_wire_ts: u32,
    audio_wire_ts: u32,
}

impl Inner {
    fn new(config: RtmpPublisherConfig, started_flag: Arc<AtomicBool>) -> Self {
        Self {
            state: SessionState::Stopped,
            started_flag,
            config,
            listener: Arc::new(NoopListener),
            chunk_encoder: ChunkEncoder::default(),
            writer: None,
            writer_task: None,
            reader_task: None,
            events_rx: None,
            app: String::new(),
            server_url: None,
            page_url: None,
            playpath: None,
            stream_id: 0,
            ack_window_out: DEFAULT_ACK_WINDOW,
            bytes_sent_since_ack: 0,
            bytes_sent_total: 0,
            peer_bandwidth_limit_type: None,
            pending_ack: None,
            pending_ping: None,
            aac_header: None,
            aac_sequence_sent: false,
            last_video_ts: -1,
            last_audio_ts: -1,
            video_wire_ts: 0,
            audio_wire_ts: 0,
        }
    }

    fn set_state(&mut self, state: SessionState) {
        tracing::debug!(from = self.state.name(), to = state.name(), "session state transition");
        self.state = state;
        self.started_flag.store(state != SessionState::Stopped, Ordering::Release);
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<Command>) {
        enum Woken {
            Cmd(Option<Command>),
            Event(Option<ReaderEvent>),
        }

        loop {
            // `events_rx` is taken out of `self` for the span of `select!` so
            // the two branches only borrow local variables, never `self` as
            // a whole — `handle_command`/`handle_reader_event` need a full
            // `&mut self` and can't run while a borrow of one of its fields
            // is still alive inside the future being polled.
            let mut events_rx = self.events_rx.take();
            let woken = tokio::select! {
                biased;
                cmd = cmd_rx.recv() => Woken::Cmd(cmd),
                event = recv_event(&mut events_rx) => Woken::Event(event),
            };
            self.events_rx = events_rx;

            match woken {
                Woken::Cmd(Some(cmd)) => self.handle_command(cmd).await,
                Woken::Cmd(None) => return,
                Woken::Event(Some(event)) => self.handle_reader_event(event).await,
                Woken::Event(None) => self.events_rx = None,
            }
        }
    }

    fn require_state(&self, expected: SessionState) -> Result<(), PublishError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PublishError::InvalidState { expected: expected.name(), actual: self.state.name() })
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { listener, app, server_url, page_url, reply } => {
                let result = self.do_start(listener, app, server_url, page_url).await;
                let _ = reply.send(result);
            }
            Command::CreateStream { playpath, reply } => {
                let result = self.do_create_stream(playpath).await;
                let _ = reply.send(result);
            }
            Command::SetAudioHeader { header, reply } => {
                self.aac_header = Some(header);
                self.aac_sequence_sent = false;
                let _ = reply.send(Ok(()));
            }
            Command::PostVideo { frame, reply } => {
                let result = self.do_post_video(frame).await;
                let _ = reply.send(result);
            }
            Command::PostAudio { frame, reply } => {
                let result = self.do_post_audio(frame).await;
                let _ = reply.send(result);
            }
            Command::SendMetaData { text, reply } => {
                let result = self.do_send_meta_data(text).await;
                let _ = reply.send(result);
            }
            Command::SendDataFrame { frame, reply } => {
                let result = self.do_send_data_frame(frame).await;
                let _ = reply.send(result);
            }
            Command::DeleteStream { reply } => {
                let result = self.do_delete_stream().await;
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                self.teardown().await;
                let _ = reply.send(Ok(()));
            }
        }
    }

    async fn do_start(
        &mut self,
        listener: Arc<dyn PublisherEventListener>,
        app: String,
        server_url: Option<String>,
        page_url: Option<String>,
    ) -> Result<(), PublishError> {
        self.require_state(SessionState::Stopped)?;
        self.listener = listener;
        self.app = app;
        self.server_url = server_url;
        self.page_url = page_url;
        self.set_state(SessionState::Connecting);

        match self.connect_and_handshake().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.listener.on_connection_error(&err);
                self.teardown().await;
                Err(err)
            }
        }
    }

    async fn connect_and_handshake(&mut self) -> Result<(), PublishError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let mut socket_addrs = tokio::net::lookup_host(&addr)
            .await
            .map_err(TransportError::from)
            .map_err(PublishError::from)?;
        let resolved = socket_addrs.next().ok_or_else(|| PublishError::Protocol(format!("could not resolve {addr}")))?;

        // The handshake runs directly against the raw socket, before
        // `Transport` splits it into a reader task half and a writer task
        // half: there is no framing yet for either task to drive.
        let mut stream = tokio::net::TcpStream::connect(resolved)
            .with_timeout(self.config.connect_timeout)
            .await
            .map_err(|_| PublishError::from(TransportError::ConnectTimeout))?
            .map_err(|err| PublishError::from(TransportError::from(err)))?;
        stream.set_nodelay(true).ok();
        perform_handshake(&mut stream, self.config.handshake_timeout).await?;

        let transport = Transport::from_stream(stream);
        let (reader, writer, writer_task) = transport.into_parts();

        self.writer = Some(writer);
        self.writer_task = Some(writer_task);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events_rx = Some(events_rx);
        self.reader_task = Some(tokio::spawn(run_reader(reader, self.ack_window_out, events_tx)));

        self.chunk_encoder = ChunkEncoder::default();
        self.chunk_encoder.set_chunk_size(crate::chunk::OUTBOUND_CHUNK_SIZE as u32);
        self.write_set_chunk_size().await?;
        self.write_window_ack_size(self.ack_window_out).await?;

        self.set_state(SessionState::AwaitingConnect);
        let tc_url = self.server_url.clone();
        let page_url = self.page_url.clone();
        let app = self.app.clone();
        self.write_connect_cmd(&app, tc_url.as_deref(), page_url.as_deref()).await?;

        Ok(())
    }

    async fn do_create_stream(&mut self, playpath: String) -> Result<(), PublishError> {
        self.require_state(SessionState::Connected)?;
        self.playpath = Some(playpath);
        self.write_create_stream_cmd().await?;
        self.set_state(SessionState::AwaitingStream);
        Ok(())
    }

    async fn do_post_video(&mut self, frame: H264Frame) -> Result<(), PublishError> {
        self.require_state(SessionState::Streaming)?;

        if frame.is_header {
            let (sps, pps) = rtmp_h264::split_annex_b_sps_pps(&frame.payload)?;
            let payload = flv::build_avc_sequence_header_payload(sps, pps);
            // The sequence header establishes a fresh baseline for this
            // chunk stream rather than carrying the frame's own clock
            // value, so the first real keyframe after it still reports a
            // delta of 0 regardless of how far apart the two timestamps
            // actually are.
            self.video_wire_ts = 0;
            return self.send_media(VIDEO_CHUNK_STREAM_ID, MessageTypeId::Video, 0, Bytes::from(payload)).await;
        }

        let mut out = Vec::with_capacity(frame.payload.len() + 9);
        flv::write_avc_nalu(&mut out, frame.is_keyframe, &frame.payload);
        let wire_ts = self.advance_video_ts(frame.timestamp_ms);
        self.send_media(VIDEO_CHUNK_STREAM_ID, MessageTypeId::Video, wire_ts, Bytes::from(out)).await
    }

    async fn do_post_audio(&mut self, frame: AacFrame) -> Result<(), PublishError> {
        self.require_state(SessionState::Streaming)?;

        // The sequence header is its own complete AUDIODATA message (sent
        // once ahead of the first raw frame, not folded into that frame's
        // payload), mirroring how `postVideo` sends the AVC sequence
        // header as a distinct message from the NALUs. Like the video
        // header, it resets this chunk stream's baseline to 0 rather than
        // carrying the triggering frame's own clock value.
        if !self.aac_sequence_sent {
            if let Some(header) = self.aac_header.clone() {
                let mut seq = Vec::with_capacity(2 + header.raw_config.len());
                flv::write_aac_sequence_header(&mut seq, header.flv_sound_format_byte(), &header.raw_config);
                self.audio_wire_ts = 0;
                self.send_media(AUDIO_CHUNK_STREAM_ID, MessageTypeId::Audio, 0, Bytes::from(seq)).await?;
                self.aac_sequence_sent = true;
            }
        }

        let tag_byte = self.aac_header.as_ref().map(AacHeader::flv_sound_format_byte).unwrap_or(0xA0);
        let mut out = Vec::with_capacity(frame.payload.len() + 2);
        flv::write_aac_raw(&mut out, tag_byte, &frame.payload);
        let wire_ts = self.advance_audio_ts(frame.timestamp_ms);
        self.send_media(AUDIO_CHUNK_STREAM_ID, MessageTypeId::Audio, wire_ts, Bytes::from(out)).await
    }

    /// Computes this video data frame's delta against `last_video_ts`
    /// (-1 sentinel means "unknown", delta 0 on the first frame), then
    /// folds that delta into the running `video_wire_ts` total so
    /// the chunk encoder's own header-to-header subtraction reproduces
    /// exactly this delta rather than one measured against an unrelated
    /// sequence-header timestamp.
    fn advance_video_ts(&mut self, frame_ts: u32) -> u32 {
        let delta = if self.last_video_ts < 0 { 0 } else { frame_ts.wrapping_sub(self.last_video_ts as u32) };
        self.last_video_ts = frame_ts as i64;
        self.video_wire_ts = self.video_wire_ts.wrapping_add(delta);
        self.video_wire_ts
    }

    /// Audio counterpart of [`Inner::advance_video_ts`].
    fn advance_audio_ts(&mut self, frame_ts: u32) -> u32 {
        let delta = if self.last_audio_ts < 0 { 0 } else { frame_ts.wrapping_sub(self.last_audio_ts as u32) };
        self.last_audio_ts = frame_ts as i64;
        self.audio_wire_ts = self.audio_wire_ts.wrapping_add(delta);
        self.audio_wire_ts
    }

    async fn do_send_meta_data(&mut self, text: String) -> Result<(), PublishError> {
        self.wait_for_ack_room().await?;
        let mut buf = Vec::new();
        write_text_data(&self.chunk_encoder, &mut buf, self.stream_id, &text)?;
        self.physical_write(buf).await
    }

    async fn do_send_data_frame(&mut self, frame: RtmpDataFrame) -> Result<(), PublishError> {
        self.wait_for_ack_room().await?;
        let pairs: Vec<(&str, Amf0Value)> = vec![
            ("width", Amf0Value::Number(frame.width as f64)),
            ("height", Amf0Value::Number(frame.height as f64)),
            ("framerate", Amf0Value::Number(frame.framerate as f64)),
            ("audiosamplerate", Amf0Value::Number(frame.audiosamplerate as f64)),
            ("videocodecid", Amf0Value::Number(frame.videocodecid as f64)),
            ("audiocodecid", Amf0Value::Number(frame.audiocodecid as f64)),
        ];
        let mut buf = Vec::new();
        write_data_frame(&self.chunk_encoder, &mut buf, self.stream_id, "onMetaData", &pairs)?;
        self.physical_write(buf).await
    }

    async fn do_delete_stream(&mut self) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        write_delete_stream(&self.chunk_encoder, &mut buf, self.stream_id, self.stream_id as f64)?;
        self.physical_write(buf).await?;

        self.playpath = None;
        self.stream_id = 0;
        self.aac_sequence_sent = false;
        self.last_video_ts = -1;
        self.last_audio_ts = -1;
        self.video_wire_ts = 0;
        self.audio_wire_ts = 0;
        // Fresh chunk streams for the next publish: per-chunk-stream
        // timestamp/format state resets so audio/video start again from
        // an absolute type-0 header rather than a delta against the
        // stream that just ended.
        self.chunk_encoder = ChunkEncoder::default();
        self.chunk_encoder.set_chunk_size(crate::chunk::OUTBOUND_CHUNK_SIZE as u32);
        self.set_state(SessionState::Connected);
        Ok(())
    }

    // -- control message senders --------------------------------------

    async fn write_set_chunk_size(&mut self) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        ProtocolControlMessageSetChunkSize { chunk_size: crate::chunk::OUTBOUND_CHUNK_SIZE as u32 }.write(&self.chunk_encoder, &mut buf)?;
        self.physical_write(buf).await
    }

    async fn write_window_ack_size(&mut self, size: u32) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        ProtocolControlMessageWindowAcknowledgementSize { acknowledgement_window_size: size }.write(&self.chunk_encoder, &mut buf)?;
        self.physical_write(buf).await
    }

    async fn write_connect_cmd(&mut self, app: &str, tc_url: Option<&str>, page_url: Option<&str>) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        write_connect(&self.chunk_encoder, &mut buf, app, tc_url, page_url)?;
        self.physical_write(buf).await
    }

    async fn write_create_stream_cmd(&mut self) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        write_create_stream(&self.chunk_encoder, &mut buf)?;
        self.physical_write(buf).await
    }

    async fn write_publish_cmd(&mut self) -> Result<(), PublishError> {
        let playpath = self.playpath.clone().unwrap_or_default();
        let mut buf = Vec::new();
        write_publish(&self.chunk_encoder, &mut buf, self.stream_id, &playpath)?;
        self.physical_write(buf).await
    }

    async fn write_ping_response_msg(&mut self, timestamp: u32) -> Result<(), PublishError> {
        let mut buf = Vec::new();
        write_ping_response(&self.chunk_encoder, &mut buf, timestamp)?;
        self.physical_write(buf).await
    }

    /// Emits one media message, first flushing any pending ACK/PING_RESPONSE
    /// as complete control messages ahead of it, in that order. `timestamp`
    /// is the wire-level value already baselined by `advance_video_ts`/
    /// `advance_audio_ts` (or 0 for a sequence header); [`ChunkEncoder::
    /// write_chunk`] only needs to diff it against the chunk stream's own
    /// last header to reproduce that same delta.
    async fn send_media(&mut self, chunk_stream_id: u32, msg_type: MessageTypeId, timestamp: u32, payload: Bytes) -> Result<(), PublishError> {
        self.wait_for_ack_room().await?;

        let mut buf = Vec::new();
        if let Some(seq) = self.pending_ack.take() {
            write_acknowledgement(&self.chunk_encoder, &mut buf, seq)?;
        }
        if let Some(ts) = self.pending_ping.take() {
            write_ping_response(&self.chunk_encoder, &mut buf, ts)?;
        }
        self.chunk_encoder
            .write_chunk(&mut buf, Chunk::new(chunk_stream_id, timestamp, msg_type, self.stream_id, payload))?;
        self.physical_write(buf).await
    }

    async fn physical_write(&mut self, buf: Vec<u8>) -> Result<(), PublishError> {
        let writer = self.writer.as_ref().ok_or(PublishError::Closed)?;
        let len = buf.len() as u64;
        writer.write(Bytes::from(buf), self.config.write_timeout).await?;
        self.bytes_sent_total += len;
        self.bytes_sent_since_ack += len;
        Ok(())
    }

    /// ACK-wait backpressure: blocks while `bytes_sent_since_ack` is
    /// at or above the 1.2x threshold, processing reader events (including
    /// the `OnAck` that will eventually clear it) until it drops back below
    /// the plain ack window, or `ack_wait_timeout` elapses.
    async fn wait_for_ack_room(&mut self) -> Result<(), PublishError> {
        let ack_window_out = self.ack_window_out as u64;
        let threshold = (ack_window_out * 12) / 10;
        if ack_window_out == 0 || self.bytes_sent_since_ack < threshold {
            return Ok(());
        }

        // Read out of `self` before the async block below captures it by
        // unique reference for its whole body (it calls `self.handle_reader_event`,
        // which needs the full `&mut self`, not just the fields read here).
        let ack_wait_timeout = self.config.ack_wait_timeout;

        let wait = async {
            while self.bytes_sent_since_ack >= ack_window_out {
                match self.events_rx.as_mut() {
                    Some(rx) => match rx.recv().await {
                        Some(event) => self.handle_reader_event(event).await,
                        None => {
                            self.events_rx = None;
                            return Err(PublishError::Closed);
                        }
                    },
                    None => return Err(PublishError::Closed),
                }
            }
            Ok(())
        };

        match wait.with_timeout(ack_wait_timeout).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::AckTimeout),
        }
    }

    async fn handle_reader_event(&mut self, event: ReaderEvent) {
        match event {
            ReaderEvent::NeedAck(bytes) => {
                self.pending_ack = Some(bytes);
            }
            ReaderEvent::OnAck(_bytes) => {
                self.bytes_sent_since_ack = 0;
            }
            ReaderEvent::NeedPingResponse(ts) => {
                if self.state == SessionState::Streaming {
                    self.pending_ping = Some(ts);
                } else if let Err(err) = self.write_ping_response_msg(ts).await {
                    self.listener.on_connection_error(&err);
                    self.teardown().await;
                }
            }
            ReaderEvent::SetPeerBandwidth(size, limit_type) => {
                self.apply_peer_bandwidth(size, limit_type).await;
            }
            ReaderEvent::OnSetChunkSize(_) => {}
            ReaderEvent::OnConnect => {
                self.set_state(SessionState::Connected);
                self.listener.on_connected();
            }
            ReaderEvent::OnStreamCreated(id) => {
                self.stream_id = id;
                if let Err(err) = self.write_publish_cmd().await {
                    self.listener.on_connection_error(&err);
                    self.teardown().await;
                } else {
                    self.set_state(SessionState::PublishSent);
                }
            }
            ReaderEvent::OnPublish => {
                self.set_state(SessionState::Streaming);
                self.listener.on_ready_to_publish();
            }
            ReaderEvent::ReaderError(err) => {
                self.listener.on_connection_error(&err);
                self.teardown().await;
            }
            ReaderEvent::TransportClosed => {
                if self.state != SessionState::Stopped {
                    let err = PublishError::Transport(crate::transport::TransportError::Closed);
                    self.listener.on_connection_error(&err);
                    self.teardown().await;
                }
            }
        }
    }

    async fn apply_peer_bandwidth(&mut self, size: u32, limit_type: ProtocolControlMessageSetPeerBandwidthLimitType) {
        use ProtocolControlMessageSetPeerBandwidthLimitType::*;

        let effective = match limit_type {
            Dynamic => self.peer_bandwidth_limit_type.filter(|t| *t == Hard).map(|_| Hard),
            other => Some(other),
        };

        let changed = match effective {
            Some(Hard) => {
                if self.ack_window_out != size {
                    self.ack_window_out = size;
                    true
                } else {
                    false
                }
            }
            Some(Soft) => {
                if size < self.ack_window_out {
                    self.ack_window_out = size;
                    true
                } else {
                    false
                }
            }
            _ => false,
        };

        if matches!(limit_type, Hard | Soft) {
            self.peer_bandwidth_limit_type = Some(limit_type);
        }

        if changed {
            tracing::debug!(ack_window_out = size, "peer bandwidth updated ack window");
            if let Err(err) = self.write_window_ack_size(size).await {
                self.listener.on_connection_error(&err);
                self.teardown().await;
            }
        }
    }

    async fn teardown(&mut self) {
        tracing::debug!(bytes_sent_total = self.bytes_sent_total, "tearing down publishing session");
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if let Some(task) = self.writer_task.take() {
            task.abort();
        }
        self.writer = None;
        self.events_rx = None;
        self.playpath = None;
        self.stream_id = 0;
        self.bytes_sent_since_ack = 0;
        self.bytes_sent_total = 0;
        self.pending_ack = None;
        self.pending_ping = None;
        self.aac_sequence_sent = false;
        self.peer_bandwidth_limit_type = None;
        self.ack_window_out = DEFAULT_ACK_WINDOW;
        self.last_video_ts = -1;
        self.last_audio_ts = -1;
        self.video_wire_ts = 0;
        self.audio_wire_ts = 0;
        self.set_state(SessionState::Stopped);
    }
}

async fn recv_event(events_rx: &mut Option<mpsc::UnboundedReceiver<ReaderEvent>>) -> Option<ReaderEvent> {
    match events_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
