//! Firmware version tags and the device profile a session decodes against.

use crate::codec::TimeAdjustment;
use crate::constants::DEFAULT_TABLE_TIMEOUT;
use crate::psem::capture::CaptureError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Firmware version with a total order (major, then minor, then build).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u16,
}

impl FirmwareVersion {
    /// First "Carbon" platform release.
    pub const CARBON: Self = Self::new(5, 0, 0);
    pub const V5_5_19: Self = Self::new(5, 5, 19);
    pub const V5_5_27: Self = Self::new(5, 5, 27);

    pub const fn new(major: u8, minor: u8, build: u16) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    pub fn at_least(&self, other: Self) -> bool {
        *self >= other
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl FromStr for FirmwareVersion {
    type Err = String;

    /// Accepts `major.minor` or `major.minor.build`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = |name: &str| -> Result<Option<u16>, String> {
            parts
                .next()
                .map(|p| p.parse::<u16>().map_err(|_| format!("invalid {name} in {s:?}")))
                .transpose()
        };
        let major = next("major")?.ok_or_else(|| format!("empty version {s:?}"))?;
        let minor = next("minor")?.unwrap_or(0);
        let build = next("build")?.unwrap_or(0);
        if parts.next().is_some() {
            return Err(format!("too many components in {s:?}"));
        }
        let narrow = |v: u16, name: &str| u8::try_from(v).map_err(|_| format!("{name} out of range in {s:?}"));
        Ok(Self::new(narrow(major, "major")?, narrow(minor, "minor")?, build))
    }
}

impl Serialize for FirmwareVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FirmwareVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseConfig {
    SinglePhase,
    #[default]
    Polyphase,
}

impl PhaseConfig {
    pub const fn phase_count(&self) -> usize {
        match self {
            Self::SinglePhase => 1,
            Self::Polyphase => 3,
        }
    }
}

/// PSEM protocol flavour the device is reached with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// C12.18 optical port / C12.21 modem.
    #[default]
    C1218,
    /// C12.22 network (comm module relays).
    C1222,
}

/// Facts about the device that are not stored in any table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub firmware: FirmwareVersion,
    pub phases: PhaseConfig,
    pub dialect: Dialect,
    pub utc_offset_minutes: i32,
    pub dst_offset_minutes: i32,
}

impl DeviceProfile {
    pub fn time_adjustment(&self) -> TimeAdjustment {
        TimeAdjustment::new(self.utc_offset_minutes, self.dst_offset_minutes)
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TABLE_TIMEOUT.as_millis() as u64
}

/// Session-wide settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub profile: DeviceProfile,
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Reject buffers longer than a fixed table size instead of ignoring the tail.
    #[serde(default)]
    pub strict_fixed_size: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: DeviceProfile::default(),
            default_timeout_ms: default_timeout_ms(),
            strict_fixed_size: false,
        }
    }
}

impl SessionConfig {
    pub fn with_profile(profile: DeviceProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
