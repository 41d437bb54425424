mod define;
mod error;
mod reader;
mod writer;

pub use define::*;
pub use error::{ChunkDecodeError, ChunkEncodeError};
pub use reader::ChunkDecoder;
pub use writer::ChunkEncoder;
