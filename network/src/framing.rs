//! Frame-length field strategies.
//!
//! The body length of a frame travels in a small fixed-size field whose
//! encoding varies by connection subtype: some peers send a big-endian
//! binary integer, others a run of ASCII decimal digits. The framer only
//! needs the field's size and a way to encode/decode it — that contract is
//! [`FrameLength`].

use byteorder::{BigEndian, ByteOrder};

use crate::error::{TransportError, TransportResult};

/// Pluggable encoding of the body-length field.
pub trait FrameLength: Send + Sync {
    /// Size of the length field on the wire, in bytes.
    fn size(&self) -> usize;

    /// Encodes `body_len` into exactly [`size`](FrameLength::size) bytes.
    fn encode(&self, body_len: usize) -> TransportResult<Vec<u8>>;

    /// Decodes a length field previously read off the wire.
    fn decode(&self, bytes: &[u8]) -> TransportResult<usize>;
}

/// Big-endian binary length field of 1 to 4 bytes.
#[derive(Debug, Clone, Copy)]
pub struct BinaryLength {
    width: usize,
}

impl BinaryLength {
    /// # Panics
    ///
    /// Panics unless `1 <= width <= 4`.
    pub fn new(width: usize) -> Self {
        assert!((1..=4).contains(&width), "length field width must be 1..=4");
        Self { width }
    }

    fn max_value(&self) -> usize {
        (1usize << (8 * self.width)) - 1
    }
}

impl FrameLength for BinaryLength {
    fn size(&self) -> usize {
        self.width
    }

    fn encode(&self, body_len: usize) -> TransportResult<Vec<u8>> {
        if body_len > self.max_value() {
            return Err(TransportError::LengthOverflow {
                len: body_len,
                width: self.width,
            });
        }
        let mut out = vec![0u8; self.width];
        BigEndian::write_uint(&mut out, body_len as u64, self.width);
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> TransportResult<usize> {
        if bytes.len() != self.width {
            return Err(TransportError::BadLength(format!(
                "expected {} bytes, got {}",
                self.width,
                bytes.len()
            )));
        }
        Ok(BigEndian::read_uint(bytes, self.width) as usize)
    }
}

/// Zero-padded ASCII decimal length field, e.g. `b"0123"` for 123.
#[derive(Debug, Clone, Copy)]
pub struct AsciiLength {
    digits: usize,
}

impl AsciiLength {
    /// # Panics
    ///
    /// Panics unless `1 <= digits <= 8`.
    pub fn new(digits: usize) -> Self {
        assert!(
            (1..=8).contains(&digits),
            "length field must be 1..=8 digits"
        );
        Self { digits }
    }

    fn max_value(&self) -> usize {
        10usize.pow(self.digits as u32) - 1
    }
}

impl FrameLength for AsciiLength {
    fn size(&self) -> usize {
        self.digits
    }

    fn encode(&self, body_len: usize) -> TransportResult<Vec<u8>> {
        if body_len > self.max_value() {
            return Err(TransportError::LengthOverflow {
                len: body_len,
                width: self.digits,
            });
        }
        Ok(format!("{:0width$}", body_len, width = self.digits).into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> TransportResult<usize> {
        if bytes.len() != self.digits {
            return Err(TransportError::BadLength(format!(
                "expected {} digits, got {} bytes",
                self.digits,
                bytes.len()
            )));
        }
        let mut value = 0usize;
        for &b in bytes {
            if !b.is_ascii_digit() {
                return Err(TransportError::BadLength(format!(
                    "non-digit bytes in length field: {bytes:02x?}"
                )));
            }
            value = value * 10 + (b - b'0') as usize;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_length_two_bytes_big_endian() {
        let codec = BinaryLength::new(2);
        assert_eq!(codec.encode(0x0102).unwrap(), vec![0x01, 0x02]);
        assert_eq!(codec.decode(&[0x01, 0x02]).unwrap(), 0x0102);
    }

    #[test]
    fn binary_length_rejects_overflow() {
        let codec = BinaryLength::new(2);
        assert!(matches!(
            codec.encode(0x1_0000),
            Err(TransportError::LengthOverflow {
                len: 0x1_0000,
                width: 2
            })
        ));
    }

    #[test]
    fn binary_length_boundary_value() {
        let codec = BinaryLength::new(2);
        assert_eq!(codec.encode(0xFFFF).unwrap(), vec![0xFF, 0xFF]);
    }

    #[test]
    fn ascii_length_zero_pads() {
        let codec = AsciiLength::new(4);
        assert_eq!(codec.encode(123).unwrap(), b"0123");
        assert_eq!(codec.decode(b"0123").unwrap(), 123);
    }

    #[test]
    fn ascii_length_rejects_non_digits() {
        let codec = AsciiLength::new(4);
        assert!(matches!(
            codec.decode(b"12x4"),
            Err(TransportError::BadLength(_))
        ));
    }

    #[test]
    #[should_panic(expected = "width must be 1..=4")]
    fn binary_length_width_validated() {
        BinaryLength::new(5);
    }
}
