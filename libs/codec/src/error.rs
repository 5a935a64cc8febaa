//! Error taxonomy for the codec layer.
//!
//! Each failure class gets its own enum so a caller can tell a bad
//! descriptor (caught at configuration time) from a bad value (caught at
//! pack time) from bad wire bytes (caught at unpack time). Layout-level
//! violations wrap the field-level error with the field number and offset
//! where it happened.

use thiserror::Error;

/// A field codec descriptor was constructed with parameters it cannot
/// represent. Raised at construction time, never at encode time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("maximum length {max} exceeds limit {limit} for this codec")]
    MaxLengthTooLarge { max: usize, limit: usize },
}

/// A value cannot be encoded under the current descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("field {number}: value length {len} exceeds maximum {max}")]
    ValueTooLong { number: u32, len: usize, max: usize },

    #[error("field {number}: codec expects a {expected} component, got {actual}")]
    WrongComponentKind {
        number: u32,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Wire bytes cannot be decoded into a field value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated buffer at offset {offset}: need {need} more bytes, got {got}")]
    Truncated {
        offset: usize,
        need: usize,
        got: usize,
    },

    #[error("invalid length prefix at offset {offset}: {reason}")]
    InvalidLength { offset: usize, reason: String },

    #[error("field payload at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("odd-length hex string: {len} digits")]
    OddHexLength { len: usize },

    #[error("invalid hex digit in binary value")]
    InvalidHexDigit,
}

/// The textual event stream is structurally invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("inner message without an enclosing outer message")]
    InnerWithoutOuter,

    #[error("top-level message opened while another message is in progress")]
    UnexpectedRoot,

    #[error("invalid field: missing id or value attribute")]
    InvalidField,

    #[error("field outside of any enclosing message")]
    FieldWithoutMessage,

    #[error("invalid {attr} attribute: {value:?}")]
    BadAttribute { attr: &'static str, value: String },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("document produced no message")]
    EmptyDocument,

    #[error("invalid binary field value: {0}")]
    BinaryValue(#[from] DecodeError),
}

/// A message layout cannot be satisfied: a required field is missing, the
/// buffer ran out mid-field, or bytes were left over after the last
/// configured field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("required field {number} missing from message")]
    MissingField { number: u32 },

    #[error("field {number} failed to pack: {source}")]
    Pack {
        number: u32,
        #[source]
        source: PackError,
    },

    #[error("field {number} failed to decode at offset {offset}: {source}")]
    Decode {
        number: u32,
        offset: usize,
        #[source]
        source: DecodeError,
    },

    #[error("{len} unconsumed bytes after last configured field")]
    TrailingBytes { len: usize },
}

/// Result type for packager operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
