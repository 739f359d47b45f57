//! MT69 Metrology Blurt: the latest status packet pushed by the metrology
//! processor.
//!
//! The layout depends only on the device profile. Single-phase meters carry
//! one phase reading, polyphase meters three. Later firmware appends fields:
//!
//! | from     | appended                                  |
//! |----------|-------------------------------------------|
//! | Carbon   | line frequency u16 (1/100 Hz)             |
//! | 5.5.19   | power factor i16 per phase (1/1000)       |
//! | 5.5.27   | blurt flags u8, reserved u8               |

use crate::codec::{TableReader, TimeFormat};
use crate::constants::MT_METROLOGY_BLURT;
use crate::error::{DecodeResult, TableResult};
use crate::table::{DeviceProfile, FirmwareVersion, TableDefinition, TableKey, TableSession};
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BlurtFlags: u8 {
        const VOLTAGE_SAG = 0x01;
        const VOLTAGE_SWELL = 0x02;
        const OVERCURRENT = 0x04;
        const REVERSE_POWER = 0x08;
        const NEUTRAL_LOSS = 0x10;
        const CALIBRATION_ACTIVE = 0x20;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseReading {
    /// Volts.
    pub voltage: f64,
    /// Amperes.
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetrologyBlurt {
    pub sequence: u16,
    pub timestamp: Option<DateTime<Utc>>,
    pub phases: Vec<PhaseReading>,
    /// Hertz.
    pub line_frequency: Option<f64>,
    pub power_factors: Option<Vec<f64>>,
    pub flags: Option<BlurtFlags>,
}

impl TableDefinition for MetrologyBlurt {
    type Deps = DeviceProfile;
    const KEY: TableKey = TableKey::manufacturer(MT_METROLOGY_BLURT);
    const NAME: &'static str = "Metrology Blurt";

    fn dependencies(session: &TableSession) -> TableResult<DeviceProfile> {
        Ok(*session.profile())
    }

    fn decode(r: &mut TableReader<'_>, profile: &DeviceProfile) -> DecodeResult<Self> {
        let firmware = profile.firmware;
        let phase_count = profile.phases.phase_count();

        let sequence = r.u16()?;
        let timestamp = r.stime(TimeFormat::SecondsSinceEpoch)?;
        let mut phases = Vec::with_capacity(phase_count);
        for _ in 0..phase_count {
            phases.push(PhaseReading {
                voltage: f64::from(r.u16()?) / 100.0,
                current: f64::from(r.u32()?) / 1000.0,
            });
        }

        let line_frequency = match firmware.at_least(FirmwareVersion::CARBON) {
            true => Some(f64::from(r.u16()?) / 100.0),
            false => None,
        };
        let power_factors = match firmware.at_least(FirmwareVersion::V5_5_19) {
            true => r.array(phase_count, |r| Ok(f64::from(r.i16()?) / 1000.0))?,
            false => None,
        };
        let flags = match firmware.at_least(FirmwareVersion::V5_5_27) {
            true => {
                let flags = BlurtFlags::from_bits_retain(r.u8()?);
                r.skip(1)?;
                Some(flags)
            }
            false => None,
        };

        Ok(Self {
            sequence,
            timestamp,
            phases,
            line_frequency,
            power_factors,
            flags,
        })
    }
}
