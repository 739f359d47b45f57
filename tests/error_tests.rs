//! Unit tests for the error enums and their `Display` implementations.

use psem_tables::error::DecodeError;
use psem_tables::psem::CaptureError;
use psem_tables::util::hex::HexError;
use psem_tables::{TableError, TableKey, TransportStatus};

/// Tests that transport failures name the table and the status.
#[test]
fn test_transport_failure_error() {
    let err = TableError::TransportFailure {
        table: TableKey::standard(21),
        status: TransportStatus::InsufficientSecurityClearance,
    };
    assert_eq!(
        err.to_string(),
        "transport failure on ST21: insufficient security clearance (ISC)"
    );
}

/// Tests that unknown response codes are shown in hex.
#[test]
fn test_unknown_status() {
    let status = TransportStatus::from_code(0x1F).unwrap();
    assert_eq!(status.to_string(), "unknown response code 0x1F");
}

/// Tests that the `DecodeInconsistency` variant is correctly formatted.
#[test]
fn test_decode_inconsistency_error() {
    let err = TableError::decode(
        TableKey::manufacturer(70),
        DecodeError::Inconsistency {
            offset: 41,
            detail: "section at offset 15 absent".to_string(),
        },
    );
    assert_eq!(
        err.to_string(),
        "inconsistent layout in MT70 at offset 41: section at offset 15 absent"
    );
}

/// Tests that the `InvalidValue` variant is correctly formatted.
#[test]
fn test_invalid_value_error() {
    let err = TableError::decode(
        TableKey::standard(0),
        DecodeError::invalid("TM_FORMAT", "unknown code 6"),
    );
    assert_eq!(err.to_string(), "invalid TM_FORMAT in ST0: unknown code 6");
}

/// Tests that sub-table keys are shown with their offset.
#[test]
fn test_unsupported_operation_error() {
    let err = TableError::UnsupportedOperation {
        table: TableKey::sub_table(TableKey::manufacturer(100), 128),
        operation: "write",
    };
    assert_eq!(err.to_string(), "unsupported operation on MT100@128: write");
    assert_eq!(err.transport_status(), None);
}

/// Tests that the reader error keeps its own wording.
#[test]
fn test_truncated_decode_error() {
    let err = DecodeError::Truncated {
        offset: 6,
        needed: 4,
        available: 1,
    };
    assert_eq!(
        err.to_string(),
        "needed 4 bytes at offset 6, only 1 available"
    );
}

/// Tests that capture errors are wrapped.
#[test]
fn test_capture_error() {
    let err: TableError = CaptureError::from(HexError::OddLength(3)).into();
    assert_eq!(
        err.to_string(),
        "capture error: hex error: Odd number of hex characters: 3"
    );
}
