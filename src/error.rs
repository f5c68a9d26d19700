use thiserror::Error;

/// Everything that can go wrong while parsing or reading a CHM/ITSS archive.
#[derive(Error, Debug)]
pub enum ChmError {
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("short read: expected {expected} bytes at offset {offset}, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("read past end of buffer")]
    OutOfBounds,

    #[error("path exceeds maximum length of {max} bytes")]
    PathTooLong { max: usize },

    #[error("entry path is not valid UTF-8")]
    InvalidPath,

    #[error("LZX decompression failed: {0}")]
    DecodeFailed(String),

    #[error("required compression metadata is missing or misplaced: {0}")]
    MissingCompressionMetadata(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChmError>;
