use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkDecodeError {
    #[error("chunk stream id {0} outside the supported range [2,63]")]
    UnsupportedChunkStreamId(u32),
    #[error("unknown message type id {0}")]
    UnknownMessageTypeId(u8),
    #[error("type 1/2/3 chunk references a chunk stream id with no prior type 0/1/2 chunk")]
    MissingPriorHeader,
}

#[derive(Debug, Error)]
pub enum ChunkEncodeError {
    #[error("chunk stream id {0} outside the supported range [2,63]")]
    UnsupportedChunkStreamId(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
