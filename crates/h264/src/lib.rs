//! # rtmp-h264
//!
//! The narrow slice of H.264 handling an RTMP publisher actually needs: find
//! the SPS/PPS NAL units inside an Annex-B-framed sequence-header buffer,
//! and lay them out as the ISO/IEC 14496-15 `AVCDecoderConfigurationRecord`
//! that FLV/RTMP sequence-header tags carry. This crate intentionally does
//! not parse SPS/PPS RBSP bits (no profile/level semantics, no cropping, no
//! VUI) — nothing downstream of this publisher needs decoded SPS fields,
//! only its raw bytes.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

#[derive(thiserror::Error, Debug)]
pub enum H264Error {
    #[error("no NAL start code found in sequence header buffer")]
    NoStartCode,
    #[error("only one NAL unit found in sequence header buffer, expected SPS and PPS")]
    MissingSecondNal,
}

/// Find an Annex-B start code (`00 00 01` or `00 00 00 01`) at or after
/// `from`. Returns `(index_of_first_0x00, code_len)`.
fn find_start_code(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 3 <= buf.len() {
        if buf[i] == 0 && buf[i + 1] == 0 {
            if buf[i + 2] == 1 {
                return Some((i, 3));
            }
            if i + 4 <= buf.len() && buf[i + 2] == 0 && buf[i + 3] == 1 {
                return Some((i, 4));
            }
        }
        i += 1;
    }
    None
}

/// Split an Annex-B buffer containing exactly `start-code SPS start-code
/// PPS` into its SPS and PPS slices (any bytes after the PPS are included
/// in the PPS slice — this publisher's sequence-header frames never carry
/// more than those two NAL units).
pub fn split_annex_b_sps_pps(buf: &[u8]) -> Result<(&[u8], &[u8]), H264Error> {
    let (first_start, first_len) = find_start_code(buf, 0).ok_or(H264Error::NoStartCode)?;
    let sps_start = first_start + first_len;

    let (second_start, second_len) = find_start_code(buf, sps_start).ok_or(H264Error::MissingSecondNal)?;
    let pps_start = second_start + second_len;

    Ok((&buf[sps_start..second_start], &buf[pps_start..]))
}

/// Build the `AVCDecoderConfigurationRecord` FLV/RTMP sequence headers
/// carry: a 5-byte fixed header (version, profile/compat/level taken from
/// `sps[1..4]`, and a length-size-minus-one byte fixed at 3, i.e. `0xff`),
/// followed by a 1-SPS list and a 1-PPS list, each `count-byte, u16
/// length, bytes`.
pub fn build_avc_decoder_configuration_record(sps: &[u8], pps: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(11 + sps.len() + pps.len());

    out.push(0x01); // configurationVersion
    out.extend_from_slice(&sps[1..sps.len().min(4)]); // AVCProfileIndication, profile_compatibility, AVCLevelIndication
    out.push(0xff); // reserved (6 bits) + lengthSizeMinusOne (2 bits) = 3

    out.push(0xe1); // reserved (3 bits) + numOfSequenceParameterSets (5 bits) = 1
    out.extend_from_slice(&(sps.len() as u16).to_be_bytes());
    out.extend_from_slice(sps);

    out.push(0x01); // numOfPictureParameterSets
    out.extend_from_slice(&(pps.len() as u16).to_be_bytes());
    out.extend_from_slice(pps);

    out
}
