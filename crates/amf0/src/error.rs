use super::marker::Amf0Marker;

#[derive(thiserror::Error, Debug)]
pub enum Amf0Error {
    #[error("unexpected end of buffer while decoding AMF0 value")]
    UnexpectedEof,

    #[error("expected marker {expected:?}, found byte {found:#04x}")]
    KindMismatch { expected: Amf0Marker, found: u8 },

    #[error("unknown AMF0 marker byte {0:#04x}")]
    UnknownMarker(u8),

    #[error("AMF0 string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
