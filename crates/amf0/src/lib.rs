//! # rtmp-amf0
//!
//! A pure-rust implementation of the AMF0 (Action Message Format, version 0)
//! encoder and decoder used by RTMP command messages.
//!
//! This crate holds no session state: it is a pair of stateless codecs, an
//! [`Amf0Encoder`] that appends typed values to a byte buffer and an
//! [`Amf0Decoder`] that reads them back out of a borrowed byte slice.
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license. You can
//! choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

mod decoder;
mod encoder;
mod error;
mod marker;
mod value;

pub use decoder::Amf0Decoder;
pub use encoder::Amf0Encoder;
pub use error::Amf0Error;
pub use marker::Amf0Marker;
pub use value::Amf0Value;
