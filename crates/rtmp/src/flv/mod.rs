//! FLV tag envelope builders: the byte layouts RTMP reuses from the FLV
//! container for AUDIO/VIDEO message payloads. Pure functions over an
//! output buffer; the only place this framing is encoded, consumed solely
//! by the publishing controller's `postVideo`/`postAudio`.

use bytes::BufMut;

/// `17 00 00 00 00` || AVCDecoderConfigurationRecord.
pub fn write_avc_sequence_header(out: &mut impl BufMut, avc_decoder_configuration_record: &[u8]) {
    out.put_u8(0x17);
    out.put_u8(0x00);
    out.put_slice(&[0x00, 0x00, 0x00]); // composition time, always 0 for a sequence header
    out.put_slice(avc_decoder_configuration_record);
}

/// `[17|27] 01` || 3-B composition-time offset || 4-B BE NALU length || NALU.
pub fn write_avc_nalu(out: &mut impl BufMut, keyframe: bool, nalu: &[u8]) {
    out.put_u8(if keyframe { 0x17 } else { 0x27 });
    out.put_u8(0x01);
    out.put_slice(&[0x00, 0x00, 0x00]);
    out.put_u32(nalu.len() as u32);
    out.put_slice(nalu);
}

/// `aac_flv_tag_byte 00` || AudioSpecificConfig.
pub fn write_aac_sequence_header(out: &mut impl BufMut, aac_flv_tag_byte: u8, audio_specific_config: &[u8]) {
    out.put_u8(aac_flv_tag_byte);
    out.put_u8(0x00);
    out.put_slice(audio_specific_config);
}

/// `aac_flv_tag_byte 01` || raw AAC payload.
pub fn write_aac_raw(out: &mut impl BufMut, aac_flv_tag_byte: u8, raw: &[u8]) {
    out.put_u8(aac_flv_tag_byte);
    out.put_u8(0x01);
    out.put_slice(raw);
}

/// Derives the FLV AUDIODATA tag byte for AAC:
/// `(soundFormat<<4)|((rateIndex<<2)&0x0C)|((soundSize<<1)&0x02)|(soundType&0x01)`.
/// `soundFormat` is always 10 (AAC) and `soundSize` always 1 (16-bit) on this path.
pub fn aac_flv_tag_byte(sample_rate_index: u8, stereo: bool) -> u8 {
    const SOUND_FORMAT_AAC: u8 = 10;
    const SOUND_SIZE_16_BIT: u8 = 1;
    let sound_type = stereo as u8;
    (SOUND_FORMAT_AAC << 4) | ((sample_rate_index << 2) & 0x0C) | ((SOUND_SIZE_16_BIT << 1) & 0x02) | (sound_type & 0x01)
}

/// Builds an AVCDecoderConfigurationRecord-prefixed sequence-header payload
/// ready to hand to [`write_avc_sequence_header`]; kept as a free function
/// (rather than folded into the controller) so it is unit-testable in
/// isolation, matching the source project's preference for small pure
/// functions over large stateful methods in this layer.
pub fn build_avc_sequence_header_payload(sps: &[u8], pps: &[u8]) -> Vec<u8> {
    let record = rtmp_h264::build_avc_decoder_configuration_record(sps, pps);
    let mut out = Vec::with_capacity(5 + record.len());
    write_avc_sequence_header(&mut out, &record);
    out
}
