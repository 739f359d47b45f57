//! MT70 Device Status, a growing table.
//!
//! Each firmware generation appended a section, and the table is read whole
//! and decoded as far as the returned length allows:
//!
//! | offset | len | section                                        |
//! |--------|-----|------------------------------------------------|
//! | 0      | 9   | status flags, outage count, uptime             |
//! | 9      | 6   | reset count, last reset time                   |
//! | 15     | 26  | firmware build, boot count, watchdog resets    |
//! | 41     | 8   | EUI-64                                         |

use crate::codec::{TableReader, TimeFormat};
use crate::constants::MT_DEVICE_STATUS;
use crate::error::{DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DeviceStatusFlags: u8 {
        const POWER_OUTAGE = 0x01;
        const COVER_OPEN = 0x02;
        const MAGNETIC_TAMPER = 0x04;
        const LOW_BATTERY = 0x08;
        const CLOCK_NOT_SET = 0x10;
        const FIRMWARE_PENDING = 0x20;
    }
}

pub const MINIMUM_LEN: usize = 9;
pub const RESET_SECTION_LEN: usize = 6;
pub const BUILD_SECTION_LEN: usize = 26;
pub const EUI_SECTION_LEN: usize = 8;

const FIRMWARE_BUILD_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetInfo {
    pub reset_count: u16,
    pub last_reset: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub firmware_build: String,
    pub boot_count: u16,
    pub watchdog_resets: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub status_flags: DeviceStatusFlags,
    pub outage_count: u32,
    pub uptime_seconds: u32,
    pub reset: Option<ResetInfo>,
    pub build: Option<BuildInfo>,
    pub eui64: Option<[u8; 8]>,
}

impl TableDefinition for DeviceStatus {
    type Deps = ();
    const KEY: TableKey = TableKey::manufacturer(MT_DEVICE_STATUS);
    const NAME: &'static str = "Device Status";

    fn dependencies(_session: &TableSession) -> TableResult<()> {
        Ok(())
    }

    fn decode(r: &mut TableReader<'_>, _deps: &()) -> DecodeResult<Self> {
        let status_flags = DeviceStatusFlags::from_bits_retain(r.u8()?);
        let outage_count = r.u32()?;
        let uptime_seconds = r.u32()?;

        let reset = match r.optional_section(RESET_SECTION_LEN)? {
            true => Some(ResetInfo {
                reset_count: r.u16()?,
                last_reset: r.stime(TimeFormat::SecondsSinceEpoch)?,
            }),
            false => None,
        };
        let build = match r.optional_section(BUILD_SECTION_LEN)? {
            true => Some(BuildInfo {
                firmware_build: r.trimmed_chars(FIRMWARE_BUILD_LEN)?,
                boot_count: r.u16()?,
                watchdog_resets: r.u32()?,
            }),
            false => None,
        };
        let eui64 = match r.optional_section(EUI_SECTION_LEN)? {
            true => Some(r.array_of::<8>()?),
            false => None,
        };

        Ok(Self {
            status_flags,
            outage_count,
            uptime_seconds,
            reset,
            build,
            eui64,
        })
    }
}
