//! Per-field encode/decode strategies.
//!
//! A field codec descriptor is built once at configuration time (maximum
//! length, diagnostic description, encoding strategy) and reused read-only
//! for every pack/unpack of that field. Construction validates what the
//! strategy can physically represent — a descriptor that cannot exist on
//! the wire is rejected with [`ConfigurationError`] up front, not at the
//! first encode.
//!
//! Strategies differ only in how the length and payload bytes are produced:
//!
//! | Codec           | Length prefix            | Payload        |
//! |-----------------|--------------------------|----------------|
//! | [`LlBinaryChar`]| 1 binary byte            | literal chars  |
//! | [`LlAsciiChar`] | 2 ASCII decimal digits   | literal chars  |
//! | [`LlBcdChar`]   | 1 byte, two BCD nibbles  | literal chars  |
//! | [`FixedChar`]   | none (fixed width)       | space-padded   |
//! | [`LlBinaryBytes`]| 1 binary byte           | raw bytes      |

use switchwire_message::Component;

use crate::error::{ConfigurationError, DecodeError, PackError};

/// Stateless per-field encode/decode contract.
///
/// `encode` fails with [`PackError`] when the value cannot be represented
/// under this descriptor (too long, wrong leaf kind). `decode` reads one
/// field starting at `offset` and returns the reconstructed component plus
/// the number of bytes consumed; it fails with [`DecodeError`] on malformed
/// or truncated input. No maximum-length check is applied on decode — the
/// wire format already bounds what a length prefix can claim.
pub trait FieldCodec: Send + Sync {
    /// Maximum permitted value length for this descriptor.
    fn max_len(&self) -> usize;

    /// Human-readable field description. Diagnostic only.
    fn description(&self) -> &str;

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError>;

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError>;
}

fn kind_of(component: &Component) -> &'static str {
    match component {
        Component::Field { .. } => "text",
        Component::Binary { .. } => "binary",
        Component::Msg(_) => "composite",
    }
}

/// Extracts the textual value of a leaf, or reports the mismatch.
fn text_value(component: &Component) -> Result<&str, PackError> {
    match component {
        Component::Field { value, .. } => Ok(value),
        other => Err(PackError::WrongComponentKind {
            number: other.number(),
            expected: "text",
            actual: kind_of(other),
        }),
    }
}

fn check_len(number: u32, len: usize, max: usize) -> Result<(), PackError> {
    if len > max {
        return Err(PackError::ValueTooLong { number, len, max });
    }
    Ok(())
}

/// Reads `need` bytes at `offset`, or reports how short the buffer is.
fn take<'a>(buf: &'a [u8], offset: usize, need: usize) -> Result<&'a [u8], DecodeError> {
    let got = buf.len().saturating_sub(offset);
    if got < need {
        return Err(DecodeError::Truncated { offset, need, got });
    }
    Ok(&buf[offset..offset + need])
}

fn utf8_field(number: u32, bytes: &[u8], offset: usize) -> Result<Component, DecodeError> {
    let value = std::str::from_utf8(bytes)
        .map_err(|_| DecodeError::InvalidUtf8 { offset })?
        .to_owned();
    Ok(Component::Field { number, value })
}

// ---------------------------------------------------------------------------
// LlBinaryChar
// ---------------------------------------------------------------------------

/// Length-prefixed literal codec: one binary length byte holding the exact
/// character count, followed by that many literal bytes.
///
/// The length byte is binary, not a digit encoding — a 10-character value
/// encodes as `0x0A`, never as ASCII `"10"` or BCD `0x10`. The maximum
/// length must fit the single length byte, so a descriptor above 255 is
/// rejected at construction.
#[derive(Debug, Clone)]
pub struct LlBinaryChar {
    max: usize,
    description: String,
}

impl LlBinaryChar {
    /// Largest value length a one-byte binary prefix can carry.
    pub const LIMIT: usize = u8::MAX as usize;

    pub fn new(max: usize, description: impl Into<String>) -> Result<Self, ConfigurationError> {
        if max > Self::LIMIT {
            return Err(ConfigurationError::MaxLengthTooLarge {
                max,
                limit: Self::LIMIT,
            });
        }
        Ok(Self {
            max,
            description: description.into(),
        })
    }
}

impl FieldCodec for LlBinaryChar {
    fn max_len(&self) -> usize {
        self.max
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError> {
        let value = text_value(component)?;
        check_len(component.number(), value.len(), self.max)?;

        let mut out = Vec::with_capacity(1 + value.len());
        out.push(value.len() as u8);
        out.extend_from_slice(value.as_bytes());
        Ok(out)
    }

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError> {
        let len = take(buf, offset, 1)?[0] as usize;
        let payload = take(buf, offset + 1, len)?;
        Ok((utf8_field(number, payload, offset + 1)?, len + 1))
    }
}

// ---------------------------------------------------------------------------
// LlAsciiChar
// ---------------------------------------------------------------------------

/// Length-prefixed literal codec with the length spelled as two ASCII
/// decimal digits: a 3-character value encodes as `b"03"` + the value.
#[derive(Debug, Clone)]
pub struct LlAsciiChar {
    max: usize,
    description: String,
}

impl LlAsciiChar {
    /// Largest value length two decimal digits can spell.
    pub const LIMIT: usize = 99;

    pub fn new(max: usize, description: impl Into<String>) -> Result<Self, ConfigurationError> {
        if max > Self::LIMIT {
            return Err(ConfigurationError::MaxLengthTooLarge {
                max,
                limit: Self::LIMIT,
            });
        }
        Ok(Self {
            max,
            description: description.into(),
        })
    }
}

impl FieldCodec for LlAsciiChar {
    fn max_len(&self) -> usize {
        self.max
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError> {
        let value = text_value(component)?;
        check_len(component.number(), value.len(), self.max)?;

        let mut out = Vec::with_capacity(2 + value.len());
        out.extend_from_slice(format!("{:02}", value.len()).as_bytes());
        out.extend_from_slice(value.as_bytes());
        Ok(out)
    }

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError> {
        let prefix = take(buf, offset, 2)?;
        if !prefix.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::InvalidLength {
                offset,
                reason: format!("expected two ASCII digits, got {prefix:02x?}"),
            });
        }
        let len = (prefix[0] - b'0') as usize * 10 + (prefix[1] - b'0') as usize;
        let payload = take(buf, offset + 2, len)?;
        Ok((utf8_field(number, payload, offset + 2)?, len + 2))
    }
}

// ---------------------------------------------------------------------------
// LlBcdChar
// ---------------------------------------------------------------------------

/// Length-prefixed literal codec with the length packed as two BCD nibbles
/// in one byte: a 12-character value encodes its length as `0x12`.
#[derive(Debug, Clone)]
pub struct LlBcdChar {
    max: usize,
    description: String,
}

impl LlBcdChar {
    /// Largest value length two BCD nibbles can carry.
    pub const LIMIT: usize = 99;

    pub fn new(max: usize, description: impl Into<String>) -> Result<Self, ConfigurationError> {
        if max > Self::LIMIT {
            return Err(ConfigurationError::MaxLengthTooLarge {
                max,
                limit: Self::LIMIT,
            });
        }
        Ok(Self {
            max,
            description: description.into(),
        })
    }
}

impl FieldCodec for LlBcdChar {
    fn max_len(&self) -> usize {
        self.max
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError> {
        let value = text_value(component)?;
        check_len(component.number(), value.len(), self.max)?;

        let len = value.len();
        let mut out = Vec::with_capacity(1 + len);
        out.push(((len / 10) << 4 | (len % 10)) as u8);
        out.extend_from_slice(value.as_bytes());
        Ok(out)
    }

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError> {
        let prefix = take(buf, offset, 1)?[0];
        let (tens, units) = ((prefix >> 4) as usize, (prefix & 0x0F) as usize);
        if tens > 9 || units > 9 {
            return Err(DecodeError::InvalidLength {
                offset,
                reason: format!("byte {prefix:#04x} is not valid BCD"),
            });
        }
        let len = tens * 10 + units;
        let payload = take(buf, offset + 1, len)?;
        Ok((utf8_field(number, payload, offset + 1)?, len + 1))
    }
}

// ---------------------------------------------------------------------------
// FixedChar
// ---------------------------------------------------------------------------

/// Fixed-width textual codec: the value is right-padded with spaces to the
/// configured width on encode; trailing pad is stripped on decode.
#[derive(Debug, Clone)]
pub struct FixedChar {
    width: usize,
    description: String,
}

impl FixedChar {
    pub fn new(width: usize, description: impl Into<String>) -> Self {
        Self {
            width,
            description: description.into(),
        }
    }
}

impl FieldCodec for FixedChar {
    fn max_len(&self) -> usize {
        self.width
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError> {
        let value = text_value(component)?;
        check_len(component.number(), value.len(), self.width)?;

        let mut out = Vec::with_capacity(self.width);
        out.extend_from_slice(value.as_bytes());
        out.resize(self.width, b' ');
        Ok(out)
    }

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError> {
        let payload = take(buf, offset, self.width)?;
        let trimmed = match payload.iter().rposition(|&b| b != b' ') {
            Some(last) => &payload[..=last],
            None => &payload[..0],
        };
        Ok((utf8_field(number, trimmed, offset)?, self.width))
    }
}

// ---------------------------------------------------------------------------
// LlBinaryBytes
// ---------------------------------------------------------------------------

/// Length-prefixed raw-byte codec for binary leaves: one binary length byte
/// holding the byte count, followed by the payload verbatim.
#[derive(Debug, Clone)]
pub struct LlBinaryBytes {
    max: usize,
    description: String,
}

impl LlBinaryBytes {
    pub const LIMIT: usize = u8::MAX as usize;

    pub fn new(max: usize, description: impl Into<String>) -> Result<Self, ConfigurationError> {
        if max > Self::LIMIT {
            return Err(ConfigurationError::MaxLengthTooLarge {
                max,
                limit: Self::LIMIT,
            });
        }
        Ok(Self {
            max,
            description: description.into(),
        })
    }
}

impl FieldCodec for LlBinaryBytes {
    fn max_len(&self) -> usize {
        self.max
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode(&self, component: &Component) -> Result<Vec<u8>, PackError> {
        let value = match component {
            Component::Binary { value, .. } => value,
            other => {
                return Err(PackError::WrongComponentKind {
                    number: other.number(),
                    expected: "binary",
                    actual: kind_of(other),
                })
            }
        };
        check_len(component.number(), value.len(), self.max)?;

        let mut out = Vec::with_capacity(1 + value.len());
        out.push(value.len() as u8);
        out.extend_from_slice(value);
        Ok(out)
    }

    fn decode(
        &self,
        number: u32,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Component, usize), DecodeError> {
        let len = take(buf, offset, 1)?[0] as usize;
        let payload = take(buf, offset + 1, len)?;
        Ok((
            Component::Binary {
                number,
                value: payload.to_vec(),
            },
            len + 1,
        ))
    }
}
