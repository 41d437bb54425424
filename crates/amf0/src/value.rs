use std::borrow::Cow;

/// A decoded (or to-be-encoded) AMF0 value.
///
/// String and object-key data borrows from the source buffer where
/// possible; call [`Amf0Value::into_owned`] to detach it.
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value<'a> {
    Number(f64),
    Boolean(bool),
    String(Cow<'a, str>),
    /// An AMF0 "object": an unordered sequence of key/value pairs terminated
    /// by the end-of-object sentinel.
    Object(Vec<(Cow<'a, str>, Amf0Value<'a>)>),
    Null,
    /// An AMF0 "ECMA array": like [`Amf0Value::Object`] but prefixed with a
    /// 32-bit associative-count that this implementation does not validate
    /// against the actual pair count on decode (real encoders are not
    /// reliable about it either).
    EcmaArray(Vec<(Cow<'a, str>, Amf0Value<'a>)>),
}

impl<'a> Amf0Value<'a> {
    /// Detach this value from the buffer it was decoded from.
    pub fn into_owned(self) -> Amf0Value<'static> {
        match self {
            Amf0Value::Number(n) => Amf0Value::Number(n),
            Amf0Value::Boolean(b) => Amf0Value::Boolean(b),
            Amf0Value::String(s) => Amf0Value::String(Cow::Owned(s.into_owned())),
            Amf0Value::Null => Amf0Value::Null,
            Amf0Value::Object(pairs) => Amf0Value::Object(owned_pairs(pairs)),
            Amf0Value::EcmaArray(pairs) => Amf0Value::EcmaArray(owned_pairs(pairs)),
        }
    }

    /// Look up a key in an [`Amf0Value::Object`] or [`Amf0Value::EcmaArray`].
    /// Returns `None` for any other variant or a missing key.
    pub fn get(&self, key: &str) -> Option<&Amf0Value<'a>> {
        match self {
            Amf0Value::Object(pairs) | Amf0Value::EcmaArray(pairs) => {
                pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn owned_pairs<'a>(pairs: Vec<(Cow<'a, str>, Amf0Value<'a>)>) -> Vec<(Cow<'static, str>, Amf0Value<'static>)> {
    pairs
        .into_iter()
        .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
        .collect()
}
