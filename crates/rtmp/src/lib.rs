//! `rtmp-publish`: an RTMP-3 publishing client. Establishes a session
//! against a media server, negotiates `connect`/`createStream`/`publish`,
//! and streams H.264/AAC frames as FLV-framed AUDIO/VIDEO messages over a
//! chunked connection — the publisher half of RTMP, not a server or a
//! player.
//!
//! The public surface is [`PublishingController`] plus the
//! [`RtmpPublisherConfig`] used to build one and the [`PublisherEventListener`]
//! callbacks it raises. Frame types ([`media::H264Frame`], [`media::AacFrame`],
//! [`media::RtmpDataFrame`]) are how the application hands encoded media in.

pub mod chunk;
pub mod command_messages;
pub mod config;
pub mod error;
pub mod flv;
pub mod handshake;
pub mod listener;
pub mod media;
pub mod messages;
pub mod protocol_control_messages;
mod session;
pub mod transport;
pub mod user_control_messages;

pub use config::RtmpPublisherConfig;
pub use error::PublishError;
pub use listener::{NoopListener, PublisherEventListener};
pub use session::PublishingController;
