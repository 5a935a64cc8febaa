//! Binary message packager: an ordered table of field codecs applied to a
//! flat byte buffer.
//!
//! `pack` walks the table in order, encodes each present field, and
//! concatenates the results into a freshly allocated buffer. `unpack` walks
//! the same table with an offset cursor until the buffer is exhausted.
//! Whether a missing field is skipped or fatal is configured per table
//! entry; whether leftover bytes after the last configured field are fatal
//! is configured per packager (strict by default).

use switchwire_message::IsoMsg;
use tracing::{debug, warn};

use crate::error::{ProtocolError, ProtocolResult};
use crate::field::FieldCodec;

struct FieldEntry {
    number: u32,
    codec: Box<dyn FieldCodec>,
    required: bool,
}

/// Ordered-table packager for the flat binary wire form.
///
/// Built once at configuration time and reused read-only; every call
/// returns a fresh buffer, so `&self` access is lock-free.
///
/// ```
/// use switchwire_codec::{BinaryPackager, LlBinaryChar};
/// use switchwire_message::IsoMsg;
///
/// let packager = BinaryPackager::new()
///     .required_field(2, LlBinaryChar::new(19, "primary account number")?)
///     .field(44, LlBinaryChar::new(25, "additional response data")?);
///
/// let mut msg = IsoMsg::root();
/// msg.set_field(2, "4111111111111111");
/// let bytes = packager.pack(&msg)?;
/// let parsed = packager.unpack(&bytes)?;
/// assert_eq!(parsed.get(2).unwrap().as_text(), Some("4111111111111111"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BinaryPackager {
    table: Vec<FieldEntry>,
    strict_trailing: bool,
}

impl BinaryPackager {
    pub fn new() -> Self {
        Self {
            table: Vec::new(),
            strict_trailing: true,
        }
    }

    /// Appends an optional field: skipped on pack when absent from the
    /// message.
    pub fn field(mut self, number: u32, codec: impl FieldCodec + 'static) -> Self {
        self.table.push(FieldEntry {
            number,
            codec: Box::new(codec),
            required: false,
        });
        self
    }

    /// Appends a required field: pack fails with
    /// [`ProtocolError::MissingField`] when absent.
    pub fn required_field(mut self, number: u32, codec: impl FieldCodec + 'static) -> Self {
        self.table.push(FieldEntry {
            number,
            codec: Box::new(codec),
            required: true,
        });
        self
    }

    /// Accepts unconsumed bytes after the last configured field instead of
    /// failing. Strict rejection is the default.
    pub fn lenient_trailing(mut self) -> Self {
        self.strict_trailing = false;
        self
    }

    /// Serializes `msg` by encoding each table entry in order.
    pub fn pack(&self, msg: &IsoMsg) -> ProtocolResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut packed = 0usize;

        for entry in &self.table {
            match msg.get(entry.number) {
                Some(component) => {
                    let bytes = entry.codec.encode(component).map_err(|source| {
                        warn!(field = entry.number, error = %source, "pack failed");
                        ProtocolError::Pack {
                            number: entry.number,
                            source,
                        }
                    })?;
                    out.extend_from_slice(&bytes);
                    packed += 1;
                }
                None if entry.required => {
                    warn!(field = entry.number, "required field missing");
                    return Err(ProtocolError::MissingField {
                        number: entry.number,
                    });
                }
                None => {}
            }
        }

        debug!(fields = packed, bytes = out.len(), "packed message");
        Ok(out)
    }

    /// Parses `buf` by decoding successive table entries until the buffer
    /// is exhausted. Exhaustion exactly at a field boundary ends the walk;
    /// truncation inside a field is an error, as are leftover bytes after
    /// the last entry when the packager is strict.
    pub fn unpack(&self, buf: &[u8]) -> ProtocolResult<IsoMsg> {
        let mut msg = IsoMsg::root();
        let mut offset = 0usize;

        for entry in &self.table {
            if offset >= buf.len() {
                break;
            }
            let (component, consumed) =
                entry.codec.decode(entry.number, buf, offset).map_err(|source| {
                    warn!(field = entry.number, offset, error = %source, "unpack failed");
                    ProtocolError::Decode {
                        number: entry.number,
                        offset,
                        source,
                    }
                })?;
            msg.set(component);
            offset += consumed;
        }

        if self.strict_trailing && offset < buf.len() {
            let len = buf.len() - offset;
            warn!(unconsumed = len, "trailing bytes after configured fields");
            return Err(ProtocolError::TrailingBytes { len });
        }

        debug!(fields = msg.len(), bytes = offset, "unpacked message");
        Ok(msg)
    }
}

impl Default for BinaryPackager {
    fn default() -> Self {
        Self::new()
    }
}
