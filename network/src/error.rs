//! Transport-layer errors: what can go wrong between a payload and the
//! stream carrying it.

use thiserror::Error;

/// Channel framing failures.
///
/// `UnexpectedEof` is the "stream closed before a declared frame was fully
/// read" case; plain IO failures (including a close cancelling an
/// in-flight read) surface as `Io`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream closed while reading frame {section}")]
    UnexpectedEof { section: &'static str },

    #[error("declared frame length {len} exceeds maximum {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("frame length {len} does not fit the configured {width}-byte length field")]
    LengthOverflow { len: usize, width: usize },

    #[error("invalid length field: {0}")]
    BadLength(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
