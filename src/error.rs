//! # Table Decoding Error Handling
//!
//! This module defines the error types of the crate: the status a PSEM
//! transport reports when a request fails, the context-free errors raised by
//! the primitive reader, and `TableError`, which attaches the failing table
//! to either of them.

use crate::constants::*;
use crate::psem::capture::CaptureError;
use crate::table::TableKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reported by the transport collaborator when a request did not
/// succeed. Surfaced verbatim; this layer never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum TransportStatus {
    /// The link failed before a response was received.
    #[error("communication error")]
    CommunicationError,

    /// No response arrived within the timeout hint.
    #[error("timeout")]
    Timeout,

    #[error("error (ERR)")]
    Error,

    #[error("service not supported (SNS)")]
    ServiceNotSupported,

    #[error("insufficient security clearance (ISC)")]
    InsufficientSecurityClearance,

    #[error("operation not possible (ONP)")]
    OperationNotPossible,

    #[error("inappropriate action requested (IAR)")]
    InappropriateActionRequested,

    #[error("device busy (BSY)")]
    DeviceBusy,

    #[error("data not ready (DNR)")]
    DataNotReady,

    #[error("data locked (DLK)")]
    DataLocked,

    #[error("renegotiate request (RNO)")]
    RenegotiateRequest,

    #[error("invalid service sequence state (ISSS)")]
    InvalidServiceSequenceState,

    /// A response code this crate has no name for.
    #[error("unknown response code 0x{0:02X}")]
    Unknown(u8),
}

impl TransportStatus {
    /// Maps a PSEM response code to a status. `0x00` (OK) is not a failure
    /// and yields `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        let status = match code {
            PSEM_OK => return None,
            PSEM_ERR => Self::Error,
            PSEM_SNS => Self::ServiceNotSupported,
            PSEM_ISC => Self::InsufficientSecurityClearance,
            PSEM_ONP => Self::OperationNotPossible,
            PSEM_IAR => Self::InappropriateActionRequested,
            PSEM_BSY => Self::DeviceBusy,
            PSEM_DNR => Self::DataNotReady,
            PSEM_DLK => Self::DataLocked,
            PSEM_RNO => Self::RenegotiateRequest,
            PSEM_ISSS => Self::InvalidServiceSequenceState,
            other => Self::Unknown(other),
        };
        Some(status)
    }

    /// The PSEM response code, when the status came from a device response.
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::CommunicationError | Self::Timeout => None,
            Self::Error => Some(PSEM_ERR),
            Self::ServiceNotSupported => Some(PSEM_SNS),
            Self::InsufficientSecurityClearance => Some(PSEM_ISC),
            Self::OperationNotPossible => Some(PSEM_ONP),
            Self::InappropriateActionRequested => Some(PSEM_IAR),
            Self::DeviceBusy => Some(PSEM_BSY),
            Self::DataNotReady => Some(PSEM_DNR),
            Self::DataLocked => Some(PSEM_DLK),
            Self::RenegotiateRequest => Some(PSEM_RNO),
            Self::InvalidServiceSequenceState => Some(PSEM_ISSS),
            Self::Unknown(code) => Some(*code),
        }
    }
}

/// Errors raised while decoding a buffer, before the owning table is known.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A required field extends past the end of the buffer.
    #[error("needed {needed} bytes at offset {offset}, only {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The buffer length implies an impossible combination of optional sections.
    #[error("inconsistent layout at offset {offset}: {detail}")]
    Inconsistency { offset: usize, detail: String },

    /// A field holds a value with no defined decoding.
    #[error("invalid {field}: {detail}")]
    InvalidValue { field: &'static str, detail: String },
}

impl DecodeError {
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            detail: detail.into(),
        }
    }
}

/// Result type for primitive decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors surfaced by table reads, writes and size resolution.
#[derive(Debug, Error)]
pub enum TableError {
    /// The transport could not fetch or store the table.
    #[error("transport failure on {table}: {status}")]
    TransportFailure {
        table: TableKey,
        status: TransportStatus,
    },

    /// Fewer bytes were available than the fixed field sequence requires.
    #[error("truncated data in {table}: needed {needed} bytes at offset {offset}, only {available} available")]
    TruncatedData {
        table: TableKey,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The returned length of a growing table cannot be decoded consistently.
    #[error("inconsistent layout in {table} at offset {offset}: {detail}")]
    DecodeInconsistency {
        table: TableKey,
        offset: usize,
        detail: String,
    },

    /// A field value has no defined decoding.
    #[error("invalid {field} in {table}: {detail}")]
    InvalidValue {
        table: TableKey,
        field: &'static str,
        detail: String,
    },

    /// The operation has no meaning for this table.
    #[error("unsupported operation on {table}: {operation}")]
    UnsupportedOperation {
        table: TableKey,
        operation: &'static str,
    },

    /// Captured data or configuration could not be loaded.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

impl TableError {
    /// Attaches the table identity to a reader error.
    pub fn decode(table: TableKey, err: DecodeError) -> Self {
        match err {
            DecodeError::Truncated {
                offset,
                needed,
                available,
            } => Self::TruncatedData {
                table,
                offset,
                needed,
                available,
            },
            DecodeError::Inconsistency { offset, detail } => Self::DecodeInconsistency {
                table,
                offset,
                detail,
            },
            DecodeError::InvalidValue { field, detail } => Self::InvalidValue {
                table,
                field,
                detail,
            },
        }
    }

    /// The table the error was raised for, if any.
    pub fn table(&self) -> Option<TableKey> {
        match self {
            Self::TransportFailure { table, .. }
            | Self::TruncatedData { table, .. }
            | Self::DecodeInconsistency { table, .. }
            | Self::InvalidValue { table, .. }
            | Self::UnsupportedOperation { table, .. } => Some(*table),
            Self::Capture(_) => None,
        }
    }

    /// The transport status for transport failures.
    pub fn transport_status(&self) -> Option<TransportStatus> {
        match self {
            Self::TransportFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in 0x01..=0x0Au8 {
            let status = TransportStatus::from_code(code).unwrap();
            assert_eq!(status.code(), Some(code));
        }
        assert_eq!(TransportStatus::from_code(PSEM_OK), None);
        assert_eq!(
            TransportStatus::from_code(0x42),
            Some(TransportStatus::Unknown(0x42))
        );
        assert_eq!(TransportStatus::Timeout.code(), None);
    }

    #[test]
    fn test_decode_error_gets_table_attached() {
        let key = TableKey::standard(23);
        let err = TableError::decode(
            key,
            DecodeError::Truncated {
                offset: 4,
                needed: 8,
                available: 2,
            },
        );
        assert!(matches!(err, TableError::TruncatedData { offset: 4, .. }));
        assert_eq!(err.table(), Some(key));
        assert_eq!(
            err.to_string(),
            "truncated data in ST23: needed 8 bytes at offset 4, only 2 available"
        );
    }
}
