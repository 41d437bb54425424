use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

use super::error::Amf0Error;
use super::marker::Amf0Marker;
use super::value::Amf0Value;

/// A cursor over a borrowed byte slice that decodes AMF0 values one at a
/// time. Holds no buffer of its own; all string/key data borrows from the
/// slice it was constructed with.
pub struct Amf0Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Amf0Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left unconsumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    fn peek_byte(&self) -> Result<u8, Amf0Error> {
        self.buf.get(self.pos).copied().ok_or(Amf0Error::UnexpectedEof)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Amf0Error> {
        if self.remaining() < n {
            return Err(Amf0Error::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_marker(&mut self) -> Result<Amf0Marker, Amf0Error> {
        let byte = self.peek_byte()?;
        let marker = Amf0Marker::from_byte(byte).ok_or(Amf0Error::UnknownMarker(byte))?;
        self.pos += 1;
        Ok(marker)
    }

    /// Decode the next value, requiring it to carry the given marker.
    pub fn decode_with_type(&mut self, expected: Amf0Marker) -> Result<Amf0Value<'a>, Amf0Error> {
        let byte = self.peek_byte()?;
        let marker = Amf0Marker::from_byte(byte).ok_or(Amf0Error::UnknownMarker(byte))?;
        if marker != expected {
            return Err(Amf0Error::KindMismatch { expected, found: byte });
        }
        self.decode()
    }

    /// Decode the next value, whatever its marker turns out to be.
    pub fn decode(&mut self) -> Result<Amf0Value<'a>, Amf0Error> {
        match self.take_marker()? {
            Amf0Marker::Number => {
                let bytes = self.take(8)?;
                Ok(Amf0Value::Number(BigEndian::read_f64(bytes)))
            }
            Amf0Marker::Boolean => {
                let byte = self.take(1)?[0];
                Ok(Amf0Value::Boolean(byte != 0))
            }
            Amf0Marker::String => Ok(Amf0Value::String(self.decode_bare_string()?)),
            Amf0Marker::Null => Ok(Amf0Value::Null),
            Amf0Marker::Object => Ok(Amf0Value::Object(self.decode_pairs_until_sentinel()?)),
            Amf0Marker::EcmaArray => {
                // 32-bit associative-array count; not validated against the
                // actual number of pairs that follow.
                let _count = BigEndian::read_u32(self.take(4)?);
                Ok(Amf0Value::EcmaArray(self.decode_pairs_until_sentinel()?))
            }
            Amf0Marker::ObjectEnd => Err(Amf0Error::UnknownMarker(Amf0Marker::ObjectEnd as u8)),
        }
    }

    /// Peek at the next marker without consuming it. Used by callers that
    /// need to choose between two decode paths (e.g. "this command
    /// argument is either an Object or Null") without relying on decode
    /// failure for control flow.
    pub fn peek_marker(&self) -> Result<Amf0Marker, Amf0Error> {
        let byte = self.peek_byte()?;
        Amf0Marker::from_byte(byte).ok_or(Amf0Error::UnknownMarker(byte))
    }

    /// Decode every remaining value in the buffer.
    pub fn decode_all(&mut self) -> Result<Vec<Amf0Value<'a>>, Amf0Error> {
        let mut values = Vec::new();
        while self.has_remaining() {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    fn decode_bare_string(&mut self) -> Result<Cow<'a, str>, Amf0Error> {
        let len = BigEndian::read_u16(self.take(2)?) as usize;
        let bytes = self.take(len)?;
        Ok(Cow::Borrowed(std::str::from_utf8(bytes)?))
    }

    /// Decode key/value pairs up to (and consuming) the end-of-object
    /// sentinel `00 00 09`.
    ///
    /// Preserves a quirk of the implementation this client is modeled on:
    /// if a key's length prefix claims more bytes than remain in the
    /// buffer, decoding stops and the pairs accumulated so far are
    /// returned rather than raising an error. This is a deliberate
    /// mirror of observed behavior (see design notes), not a decoding
    /// bug in this crate.
    fn decode_pairs_until_sentinel(&mut self) -> Result<Vec<(Cow<'a, str>, Amf0Value<'a>)>, Amf0Error> {
        let mut pairs = Vec::new();
        loop {
            // A sentinel is a zero-length key followed by the ObjectEnd marker.
            if self.remaining() >= 3 && BigEndian::read_u16(&self.buf[self.pos..self.pos + 2]) == 0 {
                if self.buf[self.pos + 2] == Amf0Marker::ObjectEnd as u8 {
                    self.pos += 3;
                    return Ok(pairs);
                }
            }

            if self.remaining() < 2 {
                return Ok(pairs);
            }
            let key_len = BigEndian::read_u16(&self.buf[self.pos..self.pos + 2]) as usize;
            if self.remaining() - 2 < key_len {
                // Over-long key length field: stop and return what we have.
                return Ok(pairs);
            }
            self.pos += 2;
            let key_bytes = self.take(key_len)?;
            let key = std::str::from_utf8(key_bytes)?;
            let value = self.decode()?;
            pairs.push((Cow::Borrowed(key), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amf0Encoder;

    fn roundtrip(value: Amf0Value) {
        let mut buf = Vec::new();
        Amf0Encoder::encode_value(&mut buf, &value).unwrap();
        let mut decoder = Amf0Decoder::new(&buf);
        let decoded = decoder.decode().unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoder.pos, buf.len());
    }

    #[test]
    fn roundtrip_number() {
        roundtrip(Amf0Value::Number(3.5));
    }

    #[test]
    fn roundtrip_boolean() {
        roundtrip(Amf0Value::Boolean(true));
        roundtrip(Amf0Value::Boolean(false));
    }

    #[test]
    fn roundtrip_string() {
        roundtrip(Amf0Value::String("live".into()));
    }

    #[test]
    fn roundtrip_null() {
        roundtrip(Amf0Value::Null);
    }

    #[test]
    fn roundtrip_object() {
        roundtrip(Amf0Value::Object(vec![
            ("app".into(), Amf0Value::String("live".into())),
            ("audioChannels".into(), Amf0Value::Number(2.0)),
        ]));
    }

    #[test]
    fn roundtrip_ecma_array() {
        roundtrip(Amf0Value::EcmaArray(vec![("width".into(), Amf0Value::Number(1280.0))]));
    }

    #[test]
    fn kind_mismatch_reports_observed_marker() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
        let mut decoder = Amf0Decoder::new(&buf);
        let err = decoder.decode_with_type(Amf0Marker::String).unwrap_err();
        match err {
            Amf0Error::KindMismatch { expected, found } => {
                assert_eq!(expected, Amf0Marker::String);
                assert_eq!(found, Amf0Marker::Number as u8);
            }
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[test]
    fn object_overlong_key_length_truncates_without_error() {
        let mut buf = Vec::new();
        buf.push(Amf0Marker::Object as u8);
        // first, a valid pair
        buf.extend_from_slice(&[0x00, 0x03]);
        buf.extend_from_slice(b"app");
        Amf0Encoder::encode_string(&mut buf, "live").unwrap();
        // then a key-length field claiming far more bytes than remain
        buf.extend_from_slice(&[0xFF, 0xFF]);

        let mut decoder = Amf0Decoder::new(&buf);
        let value = decoder.decode_with_type(Amf0Marker::Object).unwrap();
        match value {
            Amf0Value::Object(pairs) => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].0, "app");
            }
            other => panic!("wrong value: {other:?}"),
        }
    }

    #[test]
    fn decode_all_reads_every_value() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_string(&mut buf, "connect").unwrap();
        Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
        Amf0Encoder::encode_null(&mut buf).unwrap();

        let mut decoder = Amf0Decoder::new(&buf);
        let values = decoder.decode_all().unwrap();
        assert_eq!(values, vec![
            Amf0Value::String("connect".into()),
            Amf0Value::Number(1.0),
            Amf0Value::Null,
        ]);
    }

    #[test]
    fn ecma_array_uses_raw_values_not_wrapped() {
        let mut buf = Vec::new();
        buf.push(Amf0Marker::EcmaArray as u8);
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x03]);
        buf.extend_from_slice(b"key");
        buf.push(Amf0Marker::Null as u8);
        buf.extend_from_slice(&[0x00, 0x00, 0x09]);

        let mut decoder = Amf0Decoder::new(&buf);
        let value = decoder.decode_with_type(Amf0Marker::EcmaArray).unwrap();
        match value {
            Amf0Value::EcmaArray(pairs) => {
                assert_eq!(pairs[0].1, Amf0Value::Null);
            }
            other => panic!("wrong value: {other:?}"),
        }
    }
}
