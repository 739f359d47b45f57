//! # PSEM Transport Collaborator
//!
//! The decoding engine never talks to a device itself. It asks a
//! [`TableTransport`] for table bytes, either a whole table (full read) or a
//! byte range of one (offset read), and surfaces any failure status
//! unchanged. Framing, login, encryption and wire retries all live behind
//! this trait.
//!
//! ## Provided transports
//!
//! - [`mock::MockTransport`]: scripted contents, injected failures and call
//!   counters for tests and benches
//! - [`OfflineTransport`]: refuses every request; sessions built from a
//!   capture file use it so that nothing but captured bytes is decoded

pub mod capture;
pub mod mock;

pub use capture::{CaptureError, CaptureFile, CapturedTable};
pub use mock::MockTransport;

use crate::error::TransportStatus;
use std::time::Duration;

/// Byte-oriented table access offered by a PSEM session.
///
/// `timeout` is the caller's hint for how long the request may take; the
/// transport decides how to honour it.
pub trait TableTransport {
    /// Fetches the complete current contents of a table.
    fn full_read(&mut self, table_id: u16, timeout: Duration) -> Result<Vec<u8>, TransportStatus>;

    /// Fetches `count` bytes starting at `offset`.
    fn offset_read(
        &mut self,
        table_id: u16,
        offset: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportStatus>;

    fn full_write(
        &mut self,
        _table_id: u16,
        _data: &[u8],
        _timeout: Duration,
    ) -> Result<(), TransportStatus> {
        Err(TransportStatus::ServiceNotSupported)
    }

    fn offset_write(
        &mut self,
        _table_id: u16,
        _offset: u32,
        _data: &[u8],
        _timeout: Duration,
    ) -> Result<(), TransportStatus> {
        Err(TransportStatus::ServiceNotSupported)
    }

    /// Whether requests can reach a device. Live tables fall back to their
    /// last decoded snapshot when this is `false`.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Transport with no device behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl TableTransport for OfflineTransport {
    fn full_read(&mut self, _table_id: u16, _timeout: Duration) -> Result<Vec<u8>, TransportStatus> {
        Err(TransportStatus::CommunicationError)
    }

    fn offset_read(
        &mut self,
        _table_id: u16,
        _offset: u32,
        _count: usize,
        _timeout: Duration,
    ) -> Result<Vec<u8>, TransportStatus> {
        Err(TransportStatus::CommunicationError)
    }

    fn is_connected(&self) -> bool {
        false
    }
}
