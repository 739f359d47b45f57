//! # Packed Time Formats
//!
//! C12.19 encodes dates and times according to TM_FORMAT in table 0. The
//! format is not self-describing; the caller passes it with every read.
//!
//! | TM_FORMAT | STIME_DATE | LTIME_DATE | TIME |
//! |---|---|---|---|
//! | 0 no clock | 0 | 0 | 0 |
//! | 1 BCD fields | 5 | 6 | 3 |
//! | 2 UINT8 fields | 5 | 6 | 3 |
//! | 3 UINT32 minutes since 1970 | 4 | 4 + UINT8 seconds | UINT32 seconds |
//! | 4 UINT32 seconds since 1970 | 4 | 4 | UINT32 seconds |
//!
//! Values decode as UTC instants. Stamps a device recorded in local wall time
//! are shifted by the caller through [`TimeAdjustment`].

use super::{TableReader, TableWriter};
use crate::error::{DecodeError, DecodeResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    NoClock,
    Bcd,
    Uint8,
    MinutesSinceEpoch,
    SecondsSinceEpoch,
}

impl TimeFormat {
    pub fn from_code(code: u8) -> DecodeResult<Self> {
        match code {
            0 => Ok(Self::NoClock),
            1 => Ok(Self::Bcd),
            2 => Ok(Self::Uint8),
            3 => Ok(Self::MinutesSinceEpoch),
            4 => Ok(Self::SecondsSinceEpoch),
            other => Err(DecodeError::invalid("TM_FORMAT", format!("unknown code {other}"))),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::NoClock => 0,
            Self::Bcd => 1,
            Self::Uint8 => 2,
            Self::MinutesSinceEpoch => 3,
            Self::SecondsSinceEpoch => 4,
        }
    }

    pub const fn stime_len(&self) -> usize {
        match self {
            Self::NoClock => 0,
            Self::Bcd | Self::Uint8 => 5,
            Self::MinutesSinceEpoch | Self::SecondsSinceEpoch => 4,
        }
    }

    pub const fn ltime_len(&self) -> usize {
        match self {
            Self::NoClock => 0,
            Self::Bcd | Self::Uint8 => 6,
            Self::MinutesSinceEpoch => 5,
            Self::SecondsSinceEpoch => 4,
        }
    }

    pub const fn time_len(&self) -> usize {
        match self {
            Self::NoClock => 0,
            Self::Bcd | Self::Uint8 => 3,
            Self::MinutesSinceEpoch | Self::SecondsSinceEpoch => 4,
        }
    }
}

/// Converts an instant to wall time at exactly `offset`.
pub fn to_local(instant: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    instant.with_timezone(&offset)
}

/// Standard-time offset and DST shift of the meter's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeAdjustment {
    pub utc_offset_minutes: i32,
    pub dst_offset_minutes: i32,
}

impl TimeAdjustment {
    pub fn new(utc_offset_minutes: i32, dst_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes,
            dst_offset_minutes,
        }
    }

    fn total_minutes(&self, dst_active: bool) -> i32 {
        self.utc_offset_minutes + if dst_active { self.dst_offset_minutes } else { 0 }
    }

    pub fn offset(&self, dst_active: bool) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.total_minutes(dst_active) * 60)
    }

    /// Wall time for `instant` at this location.
    pub fn to_local(&self, instant: DateTime<Utc>, dst_active: bool) -> Option<DateTime<FixedOffset>> {
        self.offset(dst_active).map(|offset| to_local(instant, offset))
    }

    /// True UTC instant of a stamp the device recorded in local wall time
    /// (decoded as if it were UTC).
    pub fn local_stamp_to_utc(&self, stamp: DateTime<Utc>, dst_active: bool) -> DateTime<Utc> {
        stamp - Duration::minutes(i64::from(self.total_minutes(dst_active)))
    }
}

fn epoch_seconds(seconds: i64) -> DecodeResult<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| DecodeError::invalid("time", format!("{seconds} s since 1970 is out of range")))
}

fn bcd_byte(byte: u8) -> DecodeResult<u8> {
    let (high, low) = (byte >> 4, byte & 0x0F);
    if high > 9 || low > 9 {
        return Err(DecodeError::invalid("BCD time field", format!("0x{byte:02X}")));
    }
    Ok(high * 10 + low)
}

fn to_bcd_byte(value: u32) -> u8 {
    let value = (value % 100) as u8;
    ((value / 10) << 4) | (value % 10)
}

/// Two-digit years: 70-99 are 19xx, 00-69 are 20xx.
fn full_year(yy: u8) -> i32 {
    if yy >= 70 {
        1900 + i32::from(yy)
    } else {
        2000 + i32::from(yy)
    }
}

impl TableReader<'_> {
    /// YY MM DD HH MM [SS] fields, BCD or binary. All-zero fields mean "not set".
    fn calendar_fields(&mut self, format: TimeFormat, with_seconds: bool) -> DecodeResult<Option<DateTime<Utc>>> {
        let count = if with_seconds { 6 } else { 5 };
        let raw = self.bytes(count)?;
        if raw.iter().all(|b| *b == 0) {
            return Ok(None);
        }

        let mut fields = [0u8; 6];
        for (field, byte) in fields.iter_mut().zip(&raw) {
            *field = match format {
                TimeFormat::Bcd => bcd_byte(*byte)?,
                _ => *byte,
            };
        }
        let [yy, month, day, hour, minute, second] = fields;

        NaiveDate::from_ymd_opt(full_year(yy), u32::from(month), u32::from(day))
            .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
            .map(|naive| Some(naive.and_utc()))
            .ok_or_else(|| DecodeError::invalid("time", format!("invalid calendar fields {raw:02X?}")))
    }

    /// STIME_DATE: date and time to the minute.
    pub fn stime(&mut self, format: TimeFormat) -> DecodeResult<Option<DateTime<Utc>>> {
        if self.is_measuring() {
            self.skip(format.stime_len())?;
            return Ok(None);
        }
        match format {
            TimeFormat::NoClock => Ok(None),
            TimeFormat::Bcd | TimeFormat::Uint8 => self.calendar_fields(format, false),
            TimeFormat::MinutesSinceEpoch => {
                let minutes = self.u32()?;
                epoch_seconds(i64::from(minutes) * 60).map(Some)
            }
            TimeFormat::SecondsSinceEpoch => {
                let seconds = self.u32()?;
                epoch_seconds(i64::from(seconds)).map(Some)
            }
        }
    }

    /// LTIME_DATE: date and time to the second.
    pub fn ltime(&mut self, format: TimeFormat) -> DecodeResult<Option<DateTime<Utc>>> {
        if self.is_measuring() {
            self.skip(format.ltime_len())?;
            return Ok(None);
        }
        match format {
            TimeFormat::NoClock => Ok(None),
            TimeFormat::Bcd | TimeFormat::Uint8 => self.calendar_fields(format, true),
            TimeFormat::MinutesSinceEpoch => {
                let minutes = self.u32()?;
                let seconds = self.u8()?;
                epoch_seconds(i64::from(minutes) * 60 + i64::from(seconds)).map(Some)
            }
            TimeFormat::SecondsSinceEpoch => {
                let seconds = self.u32()?;
                epoch_seconds(i64::from(seconds)).map(Some)
            }
        }
    }

    /// TIME: time of day (or a duration) in seconds.
    pub fn time_of_day(&mut self, format: TimeFormat) -> DecodeResult<Option<u32>> {
        if self.is_measuring() {
            self.skip(format.time_len())?;
            return Ok(None);
        }
        match format {
            TimeFormat::NoClock => Ok(None),
            TimeFormat::Bcd | TimeFormat::Uint8 => {
                let raw = self.bytes(3)?;
                let mut hms = [0u32; 3];
                for (field, byte) in hms.iter_mut().zip(&raw) {
                    *field = u32::from(match format {
                        TimeFormat::Bcd => bcd_byte(*byte)?,
                        _ => *byte,
                    });
                }
                Ok(Some(hms[0] * 3600 + hms[1] * 60 + hms[2]))
            }
            TimeFormat::MinutesSinceEpoch | TimeFormat::SecondsSinceEpoch => self.u32().map(Some),
        }
    }
}

impl TableWriter {
    fn calendar_fields(&mut self, format: TimeFormat, value: Option<DateTime<Utc>>, with_seconds: bool) {
        let count = if with_seconds { 6 } else { 5 };
        let Some(value) = value else {
            self.zeros(count);
            return;
        };
        let fields = [
            value.year().rem_euclid(100) as u32,
            value.month(),
            value.day(),
            value.hour(),
            value.minute(),
            value.second(),
        ];
        for field in &fields[..count] {
            self.u8(match format {
                TimeFormat::Bcd => to_bcd_byte(*field),
                _ => *field as u8,
            });
        }
    }

    fn epoch_u32(value: Option<DateTime<Utc>>, divisor: i64) -> DecodeResult<(u32, u8)> {
        let Some(value) = value else {
            return Ok((0, 0));
        };
        let ts = value.timestamp();
        let count = u32::try_from(ts.div_euclid(divisor))
            .map_err(|_| DecodeError::invalid("time", format!("{value} does not fit in UINT32")))?;
        Ok((count, ts.rem_euclid(divisor) as u8))
    }

    pub fn stime(&mut self, format: TimeFormat, value: Option<DateTime<Utc>>) -> DecodeResult<&mut Self> {
        match format {
            TimeFormat::NoClock => {}
            TimeFormat::Bcd | TimeFormat::Uint8 => self.calendar_fields(format, value, false),
            TimeFormat::MinutesSinceEpoch => {
                let (minutes, _) = Self::epoch_u32(value, 60)?;
                self.u32(minutes);
            }
            TimeFormat::SecondsSinceEpoch => {
                let (seconds, _) = Self::epoch_u32(value, 1)?;
                self.u32(seconds);
            }
        }
        Ok(self)
    }

    pub fn ltime(&mut self, format: TimeFormat, value: Option<DateTime<Utc>>) -> DecodeResult<&mut Self> {
        match format {
            TimeFormat::NoClock => {}
            TimeFormat::Bcd | TimeFormat::Uint8 => self.calendar_fields(format, value, true),
            TimeFormat::MinutesSinceEpoch => {
                let (minutes, seconds) = Self::epoch_u32(value, 60)?;
                self.u32(minutes).u8(seconds);
            }
            TimeFormat::SecondsSinceEpoch => {
                let (seconds, _) = Self::epoch_u32(value, 1)?;
                self.u32(seconds);
            }
        }
        Ok(self)
    }

    pub fn time_of_day(&mut self, format: TimeFormat, seconds: Option<u32>) -> &mut Self {
        let seconds = seconds.unwrap_or(0);
        match format {
            TimeFormat::NoClock => {}
            TimeFormat::Bcd | TimeFormat::Uint8 => {
                for field in [seconds / 3600, (seconds / 60) % 60, seconds % 60] {
                    self.u8(match format {
                        TimeFormat::Bcd => to_bcd_byte(field),
                        _ => field as u8,
                    });
                }
            }
            TimeFormat::MinutesSinceEpoch | TimeFormat::SecondsSinceEpoch => {
                self.u32(seconds);
            }
        }
        self
    }
}
