//! Cursor-based primitive reader over an in-memory table buffer.

use crate::error::{DecodeError, DecodeResult};
use crate::util::bits::BitSet;
use log::debug;
use nom::number::complete as number;

type NomParser<'a, O> = fn(&'a [u8]) -> nom::IResult<&'a [u8], O>;

/// Ordered, side-effecting reads over a table buffer.
///
/// Each read consumes its width and advances the cursor. Reading past the
/// end fails with [`DecodeError::Truncated`].
///
/// A reader created with [`TableReader::measuring`] has no buffer: every read
/// succeeds with the zero value of its type and only the cursor moves. Running
/// a decoder over it measures the layout (see [`measure`]).
#[derive(Debug, Clone)]
pub struct TableReader<'a> {
    data: &'a [u8],
    pos: usize,
    measuring: bool,
    /// Offset at which the first optional section was found absent.
    skipped_section: Option<usize>,
    /// Declared bytes of the absent sections; later sections start past them.
    absent_len: usize,
    growable: bool,
}

/// Result of a measuring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measured {
    /// Bytes consumed with every optional section absent.
    pub len: usize,
    /// The layout declared optional trailing sections.
    pub growable: bool,
}

/// Runs `layout` over a measuring reader and reports the size it consumed.
pub fn measure<F>(layout: F) -> DecodeResult<Measured>
where
    F: FnOnce(&mut TableReader<'_>) -> DecodeResult<()>,
{
    let mut reader = TableReader::measuring();
    layout(&mut reader)?;
    Ok(Measured {
        len: reader.pos,
        growable: reader.growable,
    })
}

impl<'a> TableReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            measuring: false,
            skipped_section: None,
            absent_len: 0,
            growable: false,
        }
    }

    pub fn measuring() -> TableReader<'static> {
        TableReader {
            data: &[],
            pos: 0,
            measuring: true,
            skipped_section: None,
            absent_len: 0,
            growable: false,
        }
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// Current cursor offset from the start of the table.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the buffer being decoded (the cursor, when measuring).
    pub fn buffer_len(&self) -> usize {
        if self.measuring {
            self.pos
        } else {
            self.data.len()
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer_len().saturating_sub(self.pos)
    }

    /// Consumes `n` bytes. Yields `None` when measuring.
    fn take(&mut self, n: usize) -> DecodeResult<Option<&'a [u8]>> {
        if self.measuring {
            self.pos += n;
            return Ok(None);
        }

        let data: &'a [u8] = self.data;
        let offset = self.pos;
        let available = data.len().saturating_sub(offset);
        let input = &data[offset.min(data.len())..];
        let result: nom::IResult<&[u8], &[u8]> = nom::bytes::complete::take(n)(input);
        match result {
            Ok((_, bytes)) => {
                self.pos += n;
                Ok(Some(bytes))
            }
            Err(_) => Err(DecodeError::Truncated {
                offset,
                needed: n,
                available,
            }),
        }
    }

    fn number<O: Default>(&mut self, width: usize, parser: NomParser<'a, O>) -> DecodeResult<O> {
        let offset = self.pos;
        match self.take(width)? {
            None => Ok(O::default()),
            Some(bytes) => parser(bytes)
                .map(|(_, value)| value)
                .map_err(|_| DecodeError::Truncated {
                    offset,
                    needed: width,
                    available: bytes.len(),
                }),
        }
    }

    /// Little-endian unsigned value of `width` bytes (up to 8).
    fn wide(&mut self, width: usize) -> DecodeResult<u64> {
        Ok(self
            .take(width)?
            .map(|bytes| bytes.iter().rev().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
            .unwrap_or(0))
    }

    pub fn skip(&mut self, n: usize) -> DecodeResult<()> {
        self.take(n).map(|_| ())
    }

    pub fn u8(&mut self) -> DecodeResult<u8> {
        self.number(1, number::le_u8)
    }

    pub fn i8(&mut self) -> DecodeResult<i8> {
        self.number(1, number::le_i8)
    }

    pub fn u16(&mut self) -> DecodeResult<u16> {
        self.number(2, number::le_u16)
    }

    pub fn i16(&mut self) -> DecodeResult<i16> {
        self.number(2, number::le_i16)
    }

    pub fn u24(&mut self) -> DecodeResult<u32> {
        self.number(3, number::le_u24)
    }

    pub fn i24(&mut self) -> DecodeResult<i32> {
        self.number(3, number::le_i24)
    }

    pub fn u32(&mut self) -> DecodeResult<u32> {
        self.number(4, number::le_u32)
    }

    pub fn i32(&mut self) -> DecodeResult<i32> {
        self.number(4, number::le_i32)
    }

    pub fn u40(&mut self) -> DecodeResult<u64> {
        self.wide(5)
    }

    pub fn i40(&mut self) -> DecodeResult<i64> {
        Ok(((self.wide(5)? << 24) as i64) >> 24)
    }

    pub fn u48(&mut self) -> DecodeResult<u64> {
        self.wide(6)
    }

    pub fn i48(&mut self) -> DecodeResult<i64> {
        Ok(((self.wide(6)? << 16) as i64) >> 16)
    }

    pub fn u64(&mut self) -> DecodeResult<u64> {
        self.number(8, number::le_u64)
    }

    pub fn i64(&mut self) -> DecodeResult<i64> {
        self.number(8, number::le_i64)
    }

    pub fn f32(&mut self) -> DecodeResult<f32> {
        self.number(4, number::le_f32)
    }

    pub fn f64(&mut self) -> DecodeResult<f64> {
        self.number(8, number::le_f64)
    }

    /// Boolean stored in a whole byte (non-zero is true).
    pub fn boolean(&mut self) -> DecodeResult<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn bytes(&mut self, n: usize) -> DecodeResult<Vec<u8>> {
        Ok(self.take(n)?.map(<[u8]>::to_vec).unwrap_or_else(|| vec![0; n]))
    }

    /// Fixed-length byte array.
    pub fn array_of<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        if let Some(bytes) = self.take(N)? {
            out.copy_from_slice(bytes);
        }
        Ok(out)
    }

    /// Fixed-length character field, decoded byte-per-char (ISO 8859-1).
    /// Padding is preserved; callers trim.
    pub fn chars(&mut self, n: usize) -> DecodeResult<String> {
        Ok(self
            .take(n)?
            .map(|bytes| bytes.iter().map(|b| char::from(*b)).collect())
            .unwrap_or_default())
    }

    /// Character field with trailing spaces and NULs removed.
    pub fn trimmed_chars(&mut self, n: usize) -> DecodeResult<String> {
        let text = self.chars(n)?;
        Ok(text.trim_end_matches([' ', '\0']).to_string())
    }

    /// Repeated element sized by a count from another table. A zero count
    /// means the section is not present and yields `None`, never an empty
    /// collection.
    pub fn array<T, F>(&mut self, count: usize, mut element: F) -> DecodeResult<Option<Vec<T>>>
    where
        F: FnMut(&mut Self) -> DecodeResult<T>,
    {
        if count == 0 {
            return Ok(None);
        }
        let mut items = Vec::with_capacity(count.min(256));
        for _ in 0..count {
            items.push(element(self)?);
        }
        Ok(Some(items))
    }

    /// One-bit-per-element set of `count` elements, `ceil(count / 8)` bytes.
    pub fn bit_set(&mut self, count: usize) -> DecodeResult<Option<BitSet>> {
        if count == 0 {
            return Ok(None);
        }
        let bytes = self.bytes(BitSet::byte_len(count))?;
        Ok(Some(BitSet::from_bytes(bytes, count)))
    }

    /// Gate for an optional trailing section of `len` bytes (growing tables).
    ///
    /// Sections are laid out back to back, so each starts at its declared
    /// offset whether or not the sections before it were present. Returns
    /// `true` when the returned buffer holds the whole section. Leftover bytes
    /// too short for the section are ignored.
    pub fn optional_section(&mut self, len: usize) -> DecodeResult<bool> {
        self.optional_section_if(true, len)
    }

    /// Like [`optional_section`](Self::optional_section), for a section that
    /// also depends on a predicate (firmware version, phase count).
    ///
    /// A section with `enabled == false` is absent whatever the length. The
    /// buffer holding a later section while an earlier one is absent is an
    /// impossible shape and fails with [`DecodeError::Inconsistency`].
    pub fn optional_section_if(&mut self, enabled: bool, len: usize) -> DecodeResult<bool> {
        let start = self.pos + self.absent_len;

        if self.measuring {
            self.growable = true;
            self.skipped_section.get_or_insert(start);
            self.absent_len += len;
            return Ok(false);
        }

        let fits = start + len <= self.data.len();
        match (enabled && fits, self.skipped_section) {
            (true, Some(skipped_at)) => Err(DecodeError::Inconsistency {
                offset: start,
                detail: format!(
                    "{} bytes returned hold the {len}-byte section at offset {start} \
                     although the section at offset {skipped_at} is absent",
                    self.data.len()
                ),
            }),
            (true, None) => Ok(true),
            (false, _) => {
                if self.skipped_section.is_none() {
                    debug!(
                        "optional section of {len} bytes at offset {start} absent ({} bytes returned)",
                        self.data.len()
                    );
                    self.skipped_section = Some(start);
                }
                self.absent_len += len;
                Ok(false)
            }
        }
    }

    /// Offset of the first absent optional section, if any.
    pub fn first_absent_section(&self) -> Option<usize> {
        self.skipped_section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_little_endian() {
        let data = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        ];
        let mut r = TableReader::new(&data);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.u16().unwrap(), 0x0302);
        assert_eq!(r.u24().unwrap(), 0x06_0504);
        assert_eq!(r.u48().unwrap(), 0x0C0B_0A09_0807);
        assert_eq!(r.position(), 12);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn test_signed_sign_extension() {
        let mut r = TableReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(r.i48().unwrap(), -1);
        assert_eq!(r.i40().unwrap(), -2);

        let mut r = TableReader::new(&[0x00, 0x00, 0x80]);
        assert_eq!(r.i24().unwrap(), -8_388_608);
    }

    #[test]
    fn test_floats() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut r = TableReader::new(&data);
        assert_eq!(r.f32().unwrap(), 1.5);
        assert_eq!(r.f64().unwrap(), -2.25);
    }

    #[test]
    fn test_truncated_read_reports_position() {
        let mut r = TableReader::new(&[1, 2, 3]);
        r.u16().unwrap();
        assert_eq!(
            r.u32(),
            Err(DecodeError::Truncated {
                offset: 2,
                needed: 4,
                available: 1
            })
        );
        // cursor unchanged by the failed read
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_chars_trimming() {
        let mut r = TableReader::new(b"ITRN\0\0  SENTINEL");
        assert_eq!(r.chars(4).unwrap(), "ITRN");
        assert_eq!(r.trimmed_chars(4).unwrap(), "");
        assert_eq!(r.trimmed_chars(8).unwrap(), "SENTINEL");
    }

    #[test]
    fn test_zero_count_array_is_absent() {
        let mut r = TableReader::new(&[9, 9]);
        assert_eq!(r.array(0, |r| r.u8()).unwrap(), None);
        assert_eq!(r.bit_set(0).unwrap(), None);
        assert_eq!(r.array(2, |r| r.u8()).unwrap(), Some(vec![9, 9]));
    }

    #[test]
    fn test_measuring_counts_bytes() {
        let measured = measure(|r| {
            r.u8()?;
            r.u48()?;
            r.chars(20)?;
            r.bit_set(9)?;
            r.array(3, |r| r.u16())?;
            Ok(())
        })
        .unwrap();
        assert_eq!(measured, Measured { len: 1 + 6 + 20 + 2 + 6, growable: false });
    }

    #[test]
    fn test_optional_sections() {
        let data = [0u8; 15];
        let mut r = TableReader::new(&data);
        r.skip(9).unwrap();
        assert!(r.optional_section(6).unwrap());
        r.skip(6).unwrap();
        assert!(!r.optional_section(26).unwrap());
        assert!(!r.optional_section(8).unwrap());
        assert_eq!(r.first_absent_section(), Some(15));
    }

    #[test]
    fn test_absent_section_moves_later_sections() {
        // 9 fixed, then 6, 26 and 8: a 30-byte buffer holds only the first
        let data = [0u8; 30];
        let mut r = TableReader::new(&data);
        r.skip(9).unwrap();
        assert!(r.optional_section(6).unwrap());
        r.skip(6).unwrap();
        assert!(!r.optional_section(26).unwrap());
        assert!(!r.optional_section(8).unwrap());
        assert_eq!(r.first_absent_section(), Some(15));
        assert_eq!(r.position(), 15);
    }

    #[test]
    fn test_disabled_section_with_later_one_present_is_inconsistent() {
        let data = [0u8; 23];
        let mut r = TableReader::new(&data);
        r.skip(9).unwrap();
        assert!(!r.optional_section_if(false, 6).unwrap());
        assert!(matches!(
            r.optional_section(8),
            Err(DecodeError::Inconsistency { offset: 15, .. })
        ));

        // too short for the later section as well: nothing to contradict
        let mut r = TableReader::new(&data[..22]);
        r.skip(9).unwrap();
        assert!(!r.optional_section_if(false, 6).unwrap());
        assert!(!r.optional_section(8).unwrap());
    }

    #[test]
    fn test_measuring_marks_growable() {
        let measured = measure(|r| {
            r.skip(9)?;
            if r.optional_section(6)? {
                r.skip(6)?;
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(measured, Measured { len: 9, growable: true });
    }
}
