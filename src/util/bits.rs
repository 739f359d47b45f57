//! # Bit Field Helpers
//!
//! C12.19 packs several sub-fields into one flag byte or word (for example
//! TM_FORMAT, DATA_ACCESS_METHOD and ID_FORM share FORMAT_CONTROL_2). Boolean
//! flags are modeled with `bitflags`; multi-bit sub-fields are described with
//! [`BitField`] so their masks can be checked for overlap against each other
//! and against the boolean flags of the same word.
//!
//! [`BitSet`] models the C12.19 `SET` type: a one-bit-per-element array
//! stored in `ceil(n / 8)` bytes, element 0 in the least significant bit of
//! the first byte.

use serde::Serialize;
use thiserror::Error;

/// A named sub-field of a flag word, located by its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub mask: u32,
}

impl BitField {
    pub const fn new(name: &'static str, mask: u32) -> Self {
        Self { name, mask }
    }

    /// Right shift that aligns the field to bit 0.
    pub const fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// True when the mask is one contiguous run of bits.
    pub const fn is_contiguous(&self) -> bool {
        let aligned = self.mask >> self.shift();
        self.mask != 0 && (aligned & (aligned + 1)) == 0
    }

    /// Extracts the field value from a raw flag word.
    pub const fn extract(&self, raw: u32) -> u32 {
        (raw & self.mask) >> self.shift()
    }

    /// Returns `raw` with the field replaced by `value` (excess bits dropped).
    pub const fn insert(&self, raw: u32, value: u32) -> u32 {
        (raw & !self.mask) | ((value << self.shift()) & self.mask)
    }
}

/// Two fields of the same flag word claim the same bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bit fields {first} and {second} overlap (0x{overlap:X})")]
pub struct OverlappingFields {
    pub first: &'static str,
    pub second: &'static str,
    pub overlap: u32,
}

/// Verifies `fields` are pairwise disjoint and returns the union of their masks.
pub fn partition(fields: &[BitField]) -> Result<u32, OverlappingFields> {
    let mut union = 0u32;
    for (i, first) in fields.iter().enumerate() {
        for second in &fields[i + 1..] {
            let overlap = first.mask & second.mask;
            if overlap != 0 {
                return Err(OverlappingFields {
                    first: first.name,
                    second: second.name,
                    overlap,
                });
            }
        }
        union |= first.mask;
    }
    Ok(union)
}

/// One bit per element, packed LSB first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitSet {
    bytes: Vec<u8>,
    len: usize,
}

impl BitSet {
    /// Number of bytes needed to hold `count` one-bit elements.
    pub const fn byte_len(count: usize) -> usize {
        count.div_ceil(8)
    }

    /// Wraps raw set bytes holding `len` elements.
    pub fn from_bytes(mut bytes: Vec<u8>, len: usize) -> Self {
        bytes.resize(Self::byte_len(len), 0);
        Self { bytes, len }
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; Self::byte_len(bits.len())];
        for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
            bytes[i / 8] |= 1 << (i % 8);
        }
        Self {
            bytes,
            len: bits.len(),
        }
    }

    /// Element `index`; elements past the end read as unset.
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Indexes of the set elements.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |i| self.get(*i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_field_extract_insert() {
        let field = BitField::new("TM_FORMAT", 0x07);
        assert_eq!(field.shift(), 0);
        assert_eq!(field.extract(0b1010_1100), 0b100);

        let field = BitField::new("INT_FORMAT", 0xC0);
        assert_eq!(field.shift(), 6);
        assert_eq!(field.extract(0b1000_0000), 2);
        assert_eq!(field.insert(0x3F, 3), 0xFF);
        assert_eq!(field.insert(0xFF, 0), 0x3F);
    }

    #[test]
    fn test_contiguous_masks() {
        assert!(BitField::new("a", 0x30).is_contiguous());
        assert!(!BitField::new("b", 0x50).is_contiguous());
        assert!(!BitField::new("c", 0).is_contiguous());
    }

    #[test]
    fn test_partition_detects_overlap() {
        let fields = [
            BitField::new("A", 0x0F),
            BitField::new("B", 0x30),
            BitField::new("C", 0x18),
        ];
        let err = partition(&fields).unwrap_err();
        assert_eq!(err.first, "A");
        assert_eq!(err.second, "C");
        assert_eq!(err.overlap, 0x08);

        assert_eq!(partition(&fields[..2]), Ok(0x3F));
    }

    #[test]
    fn test_bit_set_layout() {
        let set = BitSet::from_bits(&[true, false, true, false, false, false, false, false, true]);
        assert_eq!(set.as_bytes(), &[0b0000_0101, 0b0000_0001]);
        assert_eq!(set.len(), 9);
        assert!(set.get(8));
        assert!(!set.get(9));
        assert_eq!(set.ones().collect::<Vec<_>>(), vec![0, 2, 8]);
        assert_eq!(BitSet::byte_len(0), 0);
        assert_eq!(BitSet::byte_len(2), 1);
        assert_eq!(BitSet::byte_len(17), 3);
    }
}
