//! The publishing controller's state machine.
//!
//! ```text
//! stopped --start--> connecting --handshake ok & connect sent--> awaiting_connect
//! awaiting_connect --OnConnect--> connected
//! connected --createStream--> awaiting_stream
//! awaiting_stream --OnStreamCreated--> publish_sent
//! publish_sent --OnPublish--> streaming
//! streaming --deleteStream--> connected
//! any-non-stopped --error or stop--> stopped
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Connecting,
    AwaitingConnect,
    Connected,
    AwaitingStream,
    PublishSent,
    Streaming,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Stopped => "stopped",
            SessionState::Connecting => "connecting",
            SessionState::AwaitingConnect => "awaiting_connect",
            SessionState::Connected => "connected",
            SessionState::AwaitingStream => "awaiting_stream",
            SessionState::PublishSent => "publish_sent",
            SessionState::Streaming => "streaming",
        }
    }
}
