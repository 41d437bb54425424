//! Events the reader task raises to the session actor, already classified
//! but not yet acted on — acting on them is the controller's job since it
//! depends on session state.

use crate::error::PublishError;
use crate::protocol_control_messages::ProtocolControlMessageSetPeerBandwidthLimitType;

#[derive(Debug)]
pub enum ReaderEvent {
    /// `bytes_read_total` has reached `ack_window_in`; the running counter
    /// has already been reset by the reader.
    NeedAck(u32),
    /// An ACK was received from the server for `bytes`.
    OnAck(u32),
    /// A PING_REQUEST with this timestamp needs a PING_RESPONSE.
    NeedPingResponse(u32),
    SetPeerBandwidth(u32, ProtocolControlMessageSetPeerBandwidthLimitType),
    /// The server raised its own (inbound) chunk size.
    OnSetChunkSize(u32),
    /// `_result` for `connect` reported success.
    OnConnect,
    /// `_result` for `createStream` assigned this message-stream id.
    OnStreamCreated(u32),
    /// `onStatus` for `publish` reported `NetStream.Publish.Start`.
    OnPublish,
    /// A decode/protocol error, or a server-reported failure code.
    ReaderError(PublishError),
    /// The reader hit end-of-stream on the transport.
    TransportClosed,
}
