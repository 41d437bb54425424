use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::error::Amf0Error;
use super::marker::Amf0Marker;
use super::value::Amf0Value;

/// A namespace for the stateless AMF0 encode functions. There is nothing to
/// construct; every method takes the destination writer explicitly.
pub struct Amf0Encoder;

impl Amf0Encoder {
    pub fn encode_number(writer: &mut impl io::Write, value: f64) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Number as u8)?;
        writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    pub fn encode_boolean(writer: &mut impl io::Write, value: bool) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Boolean as u8)?;
        writer.write_u8(value as u8)?;
        Ok(())
    }

    pub fn encode_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::String as u8)?;
        Self::encode_bare_string(writer, value)
    }

    pub fn encode_null(writer: &mut impl io::Write) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Null as u8)?;
        Ok(())
    }

    pub fn encode_object(writer: &mut impl io::Write, pairs: &[(impl AsRef<str>, Amf0Value)]) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Object as u8)?;
        Self::encode_pairs(writer, pairs)?;
        Self::encode_object_end(writer)
    }

    pub fn encode_ecma_array(writer: &mut impl io::Write, pairs: &[(impl AsRef<str>, Amf0Value)]) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::EcmaArray as u8)?;
        writer.write_u32::<BigEndian>(pairs.len() as u32)?;
        Self::encode_pairs(writer, pairs)?;
        Self::encode_object_end(writer)
    }

    /// Encode a single value by dispatching on its variant. Used when
    /// encoding a heterogeneous sequence of command arguments.
    pub fn encode_value(writer: &mut impl io::Write, value: &Amf0Value) -> Result<(), Amf0Error> {
        match value {
            Amf0Value::Number(n) => Self::encode_number(writer, *n),
            Amf0Value::Boolean(b) => Self::encode_boolean(writer, *b),
            Amf0Value::String(s) => Self::encode_string(writer, s),
            Amf0Value::Null => Self::encode_null(writer),
            Amf0Value::Object(pairs) => Self::encode_object(writer, pairs),
            Amf0Value::EcmaArray(pairs) => Self::encode_ecma_array(writer, pairs),
        }
    }

    fn encode_pairs(writer: &mut impl io::Write, pairs: &[(impl AsRef<str>, Amf0Value)]) -> Result<(), Amf0Error> {
        for (key, value) in pairs {
            Self::encode_bare_string(writer, key.as_ref())?;
            Self::encode_value(writer, value)?;
        }
        Ok(())
    }

    fn encode_object_end(writer: &mut impl io::Write) -> Result<(), Amf0Error> {
        // Two-byte zero-length key followed by the end-of-object marker.
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u8(Amf0Marker::ObjectEnd as u8)?;
        Ok(())
    }

    /// Writes a 16-bit-length-prefixed UTF-8 string with no leading marker
    /// byte, used for object/array keys which are never marker-tagged.
    fn encode_bare_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0Error> {
        writer.write_u16::<BigEndian>(value.len() as u16)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }
}
