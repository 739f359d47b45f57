//! # Non-Integer (NI) Formats
//!
//! Register values in C12.19 are stored in one of the NI formats selected by
//! NI_FORMAT1 / NI_FORMAT2 of table 0. All formats decode to `f64`; the
//! `Int32Scaled` format carries an implied decimal point four digits from the
//! right.

use super::{TableReader, TableWriter};
use crate::error::{DecodeError, DecodeResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NiFormat {
    #[default]
    Float64,
    Float32,
    FloatChar12,
    FloatChar6,
    /// INT32 with an implied divisor of 10 000.
    Int32Scaled,
    FixedBcd6,
    FixedBcd4,
    Int24,
    Int32,
    Int40,
    Int48,
    FixedBcd8,
    FloatChar21,
}

const INT32_SCALE: f64 = 10_000.0;

impl NiFormat {
    pub fn from_code(code: u8) -> DecodeResult<Self> {
        Ok(match code {
            0 => Self::Float64,
            1 => Self::Float32,
            2 => Self::FloatChar12,
            3 => Self::FloatChar6,
            4 => Self::Int32Scaled,
            5 => Self::FixedBcd6,
            6 => Self::FixedBcd4,
            7 => Self::Int24,
            8 => Self::Int32,
            9 => Self::Int40,
            10 => Self::Int48,
            11 => Self::FixedBcd8,
            12 => Self::FloatChar21,
            other => return Err(DecodeError::invalid("NI_FORMAT", format!("unknown code {other}"))),
        })
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::Float64 => 0,
            Self::Float32 => 1,
            Self::FloatChar12 => 2,
            Self::FloatChar6 => 3,
            Self::Int32Scaled => 4,
            Self::FixedBcd6 => 5,
            Self::FixedBcd4 => 6,
            Self::Int24 => 7,
            Self::Int32 => 8,
            Self::Int40 => 9,
            Self::Int48 => 10,
            Self::FixedBcd8 => 11,
            Self::FloatChar21 => 12,
        }
    }

    /// Encoded width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            Self::Float64 => 8,
            Self::Float32 => 4,
            Self::FloatChar12 => 12,
            Self::FloatChar6 => 6,
            Self::Int32Scaled => 4,
            Self::FixedBcd6 => 6,
            Self::FixedBcd4 => 4,
            Self::Int24 => 3,
            Self::Int32 => 4,
            Self::Int40 => 5,
            Self::Int48 => 6,
            Self::FixedBcd8 => 8,
            Self::FloatChar21 => 21,
        }
    }
}

fn decode_bcd_digits(bytes: &[u8]) -> DecodeResult<f64> {
    let mut value = 0u64;
    for byte in bytes {
        let (high, low) = (byte >> 4, byte & 0x0F);
        if high > 9 || low > 9 {
            return Err(DecodeError::invalid("FIXED-BCD value", format!("0x{byte:02X}")));
        }
        value = value * 100 + u64::from(high) * 10 + u64::from(low);
    }
    Ok(value as f64)
}

fn rounded_in_range(value: f64, bits: u32, format: NiFormat) -> DecodeResult<i64> {
    let limit = 1i64 << (bits - 1);
    let rounded = value.round();
    if !rounded.is_finite() || rounded < -(limit as f64) || rounded >= limit as f64 {
        return Err(DecodeError::invalid(
            "NI value",
            format!("{value} does not fit {format:?}"),
        ));
    }
    Ok(rounded as i64)
}

impl TableReader<'_> {
    pub fn ni(&mut self, format: NiFormat) -> DecodeResult<f64> {
        if self.is_measuring() {
            self.skip(format.width())?;
            return Ok(0.0);
        }
        match format {
            NiFormat::Float64 => self.f64(),
            NiFormat::Float32 => self.f32().map(f64::from),
            NiFormat::Int32Scaled => self.i32().map(|v| f64::from(v) / INT32_SCALE),
            NiFormat::Int24 => self.i24().map(f64::from),
            NiFormat::Int32 => self.i32().map(f64::from),
            NiFormat::Int40 => self.i40().map(|v| v as f64),
            NiFormat::Int48 => self.i48().map(|v| v as f64),
            NiFormat::FixedBcd4 | NiFormat::FixedBcd6 | NiFormat::FixedBcd8 => {
                let bytes = self.bytes(format.width())?;
                decode_bcd_digits(&bytes)
            }
            NiFormat::FloatChar6 | NiFormat::FloatChar12 | NiFormat::FloatChar21 => {
                let text = self.chars(format.width())?;
                let trimmed = text.trim_matches([' ', '\0']);
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| DecodeError::invalid("FLOAT-CHAR value", format!("{trimmed:?}")))
            }
        }
    }
}

impl TableWriter {
    pub fn ni(&mut self, format: NiFormat, value: f64) -> DecodeResult<&mut Self> {
        match format {
            NiFormat::Float64 => {
                self.f64(value);
            }
            NiFormat::Float32 => {
                self.f32(value as f32);
            }
            NiFormat::Int32Scaled => {
                let scaled = rounded_in_range(value * INT32_SCALE, 32, format)?;
                self.i32(scaled as i32);
            }
            NiFormat::Int24 => {
                let v = rounded_in_range(value, 24, format)?;
                self.i24(v as i32);
            }
            NiFormat::Int32 => {
                let v = rounded_in_range(value, 32, format)?;
                self.i32(v as i32);
            }
            NiFormat::Int40 => {
                let v = rounded_in_range(value, 40, format)?;
                self.i40(v);
            }
            NiFormat::Int48 => {
                let v = rounded_in_range(value, 48, format)?;
                self.i48(v);
            }
            NiFormat::FixedBcd4 | NiFormat::FixedBcd6 | NiFormat::FixedBcd8 => {
                let width = format.width();
                let digits = format!("{:0>1$}", value.round() as u64, width * 2);
                if value < 0.0 || digits.len() > width * 2 {
                    return Err(DecodeError::invalid(
                        "NI value",
                        format!("{value} does not fit {format:?}"),
                    ));
                }
                for pair in digits.as_bytes().chunks(2) {
                    self.u8(((pair[0] - b'0') << 4) | (pair[1] - b'0'));
                }
            }
            NiFormat::FloatChar6 | NiFormat::FloatChar12 | NiFormat::FloatChar21 => {
                let width = format.width();
                self.chars(&format!("{value:>width$}"), width)?;
            }
        }
        Ok(self)
    }
}
