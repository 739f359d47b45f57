//! ST52 Clock Table. The device clock moves on every read, so the table is
//! live.

use crate::codec::{TableReader, TimeAdjustment, TimeFormat};
use crate::constants::{ST_CLOCK, TIME_DATE_QUAL_DAY_OF_WEEK_MASK};
use crate::error::{DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::tables::standard::general_config::session_formats;
use crate::util::BitField;
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    /// TIME_DATE_QUAL boolean bits; bits 0-2 hold [`DAY_OF_WEEK`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TimeDateQual: u8 {
        const DST_FLAG = 0x08;
        const GMT_FLAG = 0x10;
        const TM_ZN_APPLIED = 0x20;
        const DST_APPLIED = 0x40;
        const DST_SUPPORTED = 0x80;
    }
}

/// 0 Sunday to 6 Saturday, 7 unknown.
pub const DAY_OF_WEEK: BitField = BitField::new("DAY_OF_WEEK", TIME_DATE_QUAL_DAY_OF_WEEK_MASK as u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clock {
    /// CLOCK_CALENDAR as stored; device local time unless GMT_FLAG is set.
    pub clock_calendar: Option<DateTime<Utc>>,
    pub time_date_qual_raw: u8,
}

impl Clock {
    pub fn time_date_qual(&self) -> TimeDateQual {
        TimeDateQual::from_bits_truncate(self.time_date_qual_raw)
    }

    pub fn day_of_week(&self) -> u8 {
        DAY_OF_WEEK.extract(u32::from(self.time_date_qual_raw)) as u8
    }

    pub fn is_dst(&self) -> bool {
        self.time_date_qual().contains(TimeDateQual::DST_FLAG)
    }

    /// The clock as a UTC instant. Local stamps are shifted back by the
    /// location's offsets; GMT stamps are returned unchanged.
    pub fn utc_time(&self, adjustment: &TimeAdjustment) -> Option<DateTime<Utc>> {
        let stamp = self.clock_calendar?;
        if self.time_date_qual().contains(TimeDateQual::GMT_FLAG) {
            return Some(stamp);
        }
        Some(adjustment.local_stamp_to_utc(stamp, self.is_dst()))
    }
}

impl TableDefinition for Clock {
    type Deps = TimeFormat;
    const KEY: TableKey = TableKey::standard(ST_CLOCK);
    const NAME: &'static str = "Clock";
    const LIVE: bool = true;

    fn dependencies(session: &TableSession) -> TableResult<TimeFormat> {
        Ok(session_formats(session)?.time)
    }

    fn decode(r: &mut TableReader<'_>, time_format: &TimeFormat) -> DecodeResult<Self> {
        Ok(Self {
            clock_calendar: r.ltime(*time_format)?,
            time_date_qual_raw: r.u8()?,
        })
    }
}
