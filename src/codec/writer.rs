//! Primitive encoder mirroring [`TableReader`](super::TableReader).
//!
//! Used to build table images for writes and test fixtures. Field order is
//! the caller's responsibility, exactly as with the reader.

use crate::error::{DecodeError, DecodeResult};
use crate::util::bits::BitSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableWriter {
    buf: Vec<u8>,
}

impl TableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Low three bytes of `value`.
    pub fn u24(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..3]);
        self
    }

    pub fn i24(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..3]);
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Low five bytes of `value`.
    pub fn u40(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..5]);
        self
    }

    pub fn i40(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..5]);
        self
    }

    /// Low six bytes of `value`.
    pub fn u48(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..6]);
        self
    }

    pub fn i48(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes()[..6]);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    /// Character field of exactly `len` bytes, space padded.
    pub fn chars(&mut self, text: &str, len: usize) -> DecodeResult<&mut Self> {
        let mut encoded = Vec::with_capacity(len);
        for c in text.chars() {
            let byte = u8::try_from(u32::from(c))
                .map_err(|_| DecodeError::invalid("character field", format!("{c:?} is not ISO 8859-1")))?;
            encoded.push(byte);
        }
        if encoded.len() > len {
            return Err(DecodeError::invalid(
                "character field",
                format!("{text:?} does not fit in {len} bytes"),
            ));
        }
        encoded.resize(len, b' ');
        self.buf.extend_from_slice(&encoded);
        Ok(self)
    }

    pub fn bit_set(&mut self, set: &BitSet) -> &mut Self {
        self.buf.extend_from_slice(set.as_bytes());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TableReader;

    #[test]
    fn test_writer_matches_reader_widths() {
        let mut w = TableWriter::new();
        w.u8(7).u16(0x0302).u24(0x06_0504).i40(-2).u48(0x0C0B_0A09_0807).f32(1.5);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 1 + 2 + 3 + 5 + 6 + 4);

        let mut r = TableReader::new(&bytes);
        assert_eq!(r.u8().unwrap(), 7);
        assert_eq!(r.u16().unwrap(), 0x0302);
        assert_eq!(r.u24().unwrap(), 0x06_0504);
        assert_eq!(r.i40().unwrap(), -2);
        assert_eq!(r.u48().unwrap(), 0x0C0B_0A09_0807);
        assert_eq!(r.f32().unwrap(), 1.5);
    }

    #[test]
    fn test_chars_padding_and_overflow() {
        let mut w = TableWriter::new();
        w.chars("ITRN", 6).unwrap();
        assert_eq!(w.as_bytes(), b"ITRN  ");
        assert!(w.chars("TOO LONG", 4).is_err());
        assert!(w.chars("€", 4).is_err());
    }
}
