//! Media frame types the application hands to `postVideo`/`postAudio`.
//! Production, storage, and decoding of these frames is an external
//! collaborator's job — an H.264 frame provider and an AAC frame provider
//! sit upstream of this crate, which only needs the flagged fields below.

use bytes::Bytes;

/// One H.264 access unit, or a sequence-header buffer carrying SPS/PPS.
#[derive(Debug, Clone)]
pub struct H264Frame {
    /// True when `payload` is an Annex-B buffer containing `start-code SPS
    /// start-code PPS` rather than a NALU to publish directly.
    pub is_header: bool,
    /// True when this is a keyframe (IDR); ignored when `is_header` is set.
    pub is_keyframe: bool,
    /// Presentation timestamp in milliseconds, from the external clock.
    pub timestamp_ms: u32,
    pub payload: Bytes,
}

impl H264Frame {
    pub fn sequence_header(timestamp_ms: u32, annex_b_sps_pps: impl Into<Bytes>) -> Self {
        Self {
            is_header: true,
            is_keyframe: false,
            timestamp_ms,
            payload: annex_b_sps_pps.into(),
        }
    }

    pub fn nalu(timestamp_ms: u32, keyframe: bool, payload: impl Into<Bytes>) -> Self {
        Self {
            is_header: false,
            is_keyframe: keyframe,
            timestamp_ms,
            payload: payload.into(),
        }
    }
}

/// One AAC raw data frame (never a sequence header — that comes from the
/// `AacHeader` registered via `setAudioHeader`).
#[derive(Debug, Clone)]
pub struct AacFrame {
    pub timestamp_ms: u32,
    pub payload: Bytes,
}

/// The recognized `onMetaData` keys `sendDataFrame` emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtmpDataFrame {
    pub width: i32,
    pub height: i32,
    pub framerate: i32,
    pub audiosamplerate: i32,
    pub videocodecid: i32,
    pub audiocodecid: i32,
}
