//! # rtmp-bytes-util
//!
//! Small, fallible extensions to [`bytes::Buf`] for cursors that need to
//! check "do I have enough bytes yet?" without panicking — the RTMP chunk
//! deframer reads from a growing [`bytes::BytesMut`] and must be able to
//! say "not enough, try again once more bytes arrive" instead of crashing.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

use bytes::{Buf, Bytes};

/// Fallible, non-panicking reads on top of [`bytes::Buf`].
pub trait BytesCursorExt: Buf {
    fn try_get_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        Some(self.get_u8())
    }

    fn try_get_u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        Some(self.get_u16())
    }

    /// Reads a 24-bit big-endian unsigned integer, as used by RTMP chunk
    /// timestamps and message lengths.
    fn try_get_u24(&mut self) -> Option<u32> {
        if self.remaining() < 3 {
            return None;
        }
        let hi = self.get_u8() as u32;
        let mid = self.get_u8() as u32;
        let lo = self.get_u8() as u32;
        Some((hi << 16) | (mid << 8) | lo)
    }

    fn try_get_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        Some(self.get_u32())
    }

    /// Little-endian 32-bit read, used only for the RTMP chunk message
    /// stream ID field (the one field in the chunk header that is not
    /// big-endian).
    fn try_get_u32_le(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        Some(self.get_u32_le())
    }

    fn try_copy_to_bytes(&mut self, len: usize) -> Option<Bytes> {
        if self.remaining() < len {
            return None;
        }
        Some(self.copy_to_bytes(len))
    }
}

impl<T: Buf> BytesCursorExt for T {}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn try_get_u24_reads_big_endian() {
        let mut buf = BytesMut::from(&[0x01, 0x02, 0x03][..]);
        assert_eq!(buf.try_get_u24(), Some(0x00010203));
    }

    #[test]
    fn try_get_returns_none_without_consuming_on_insufficient_bytes() {
        let mut buf = BytesMut::from(&[0x01, 0x02][..]);
        assert_eq!(buf.try_get_u24(), None);
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn try_get_u32_le_matches_native_le_layout() {
        let mut buf = BytesMut::from(&[0x01, 0x00, 0x00, 0x00][..]);
        assert_eq!(buf.try_get_u32_le(), Some(1));
    }
}
