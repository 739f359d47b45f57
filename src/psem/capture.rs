//! Capture files: table buffers recorded from a device, stored as JSON with
//! hex-encoded data, and replayed into an offline session.
//!
//! ```json
//! {
//!   "profile": { "firmware": "5.5.19", "phases": "polyphase" },
//!   "tables": [ { "id": 21, "offset": 0, "data": "0100030402010002..." } ]
//! }
//! ```

use crate::table::{DeviceProfile, SessionConfig, TableKey, TableSession};
use crate::util::hex::{decode_hex, encode_hex, HexError};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("hex error: {0}")]
    Hex(#[from] HexError),
}

mod hex_data {
    use crate::util::hex::{decode_hex, encode_hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hex(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// One captured table buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedTable {
    pub id: u16,
    #[serde(default)]
    pub offset: u32,
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

impl CapturedTable {
    pub fn new(key: TableKey, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: key.id,
            offset: key.offset,
            data: data.into(),
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey {
            id: self.id,
            offset: self.offset,
        }
    }

    pub fn data_hex(&self) -> String {
        encode_hex(&self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    #[serde(default)]
    pub profile: DeviceProfile,
    #[serde(default)]
    pub tables: Vec<CapturedTable>,
}

impl CaptureFile {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            tables: Vec::new(),
        }
    }

    /// Adds a buffer given as hex text.
    pub fn push_hex(&mut self, key: TableKey, data: &str) -> Result<(), CaptureError> {
        self.tables.push(CapturedTable::new(key, decode_hex(data)?));
        Ok(())
    }

    pub fn get(&self, key: TableKey) -> Option<&CapturedTable> {
        self.tables.iter().find(|t| t.key() == key)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, CaptureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), CaptureError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Seeds every captured buffer into `session`.
    pub fn seed_into(&self, session: &TableSession) {
        for table in &self.tables {
            session.seed(table.key(), table.data.clone());
        }
    }

    /// Builds an offline session over the captured buffers. Tables decode
    /// lazily on first access and no transport request is ever issued.
    pub fn into_session(self) -> TableSession {
        let session = TableSession::offline(SessionConfig::with_profile(self.profile));
        self.seed_into(&session);
        info!("replay session with {} captured tables", self.tables.len());
        session
    }

    /// Records every buffer a session holds.
    pub fn capture(session: &TableSession) -> Self {
        Self {
            profile: *session.profile(),
            tables: session
                .raw_tables()
                .into_iter()
                .map(|(key, data)| CapturedTable::new(key, data.to_vec()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FirmwareVersion;

    #[test]
    fn test_json_round_trip() {
        let mut capture = CaptureFile::new(DeviceProfile {
            firmware: FirmwareVersion::V5_5_27,
            ..DeviceProfile::default()
        });
        capture.push_hex(TableKey::standard(21), "01 00 03 04").unwrap();
        let json = capture.to_json_string().unwrap();
        assert!(json.contains("\"5.5.27\""));
        assert!(json.contains("\"01000304\""));
        assert_eq!(CaptureFile::from_json_str(&json).unwrap(), capture);
    }

    #[test]
    fn test_bad_hex_rejected() {
        let json = r#"{ "tables": [ { "id": 21, "data": "0g" } ] }"#;
        assert!(matches!(
            CaptureFile::from_json_str(json),
            Err(CaptureError::Json(_))
        ));
        let mut capture = CaptureFile::default();
        assert!(matches!(
            capture.push_hex(TableKey::standard(0), "abc"),
            Err(CaptureError::Hex(HexError::OddLength(3)))
        ));
    }

    #[test]
    fn test_seeded_session_exposes_raw_bytes() {
        let mut capture = CaptureFile::default();
        capture.push_hex(TableKey::manufacturer(70), "0102").unwrap();
        let session = capture.clone().into_session();
        assert!(!session.is_connected());
        assert_eq!(
            session.raw_bytes(TableKey::manufacturer(70)).as_deref(),
            Some(&[1u8, 2][..])
        );
        assert_eq!(CaptureFile::capture(&session), capture);
    }
}
