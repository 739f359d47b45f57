//! Mock PSEM transport for testing
//!
//! Serves scripted table contents without a device, injects failures, and
//! counts every request so tests can assert how often the engine fetched.

use super::TableTransport;
use crate::error::TransportStatus;
use crate::table::TableKey;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Kind of request recorded by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FullRead,
    OffsetRead,
    FullWrite,
    OffsetWrite,
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub table_id: u16,
    pub offset: u32,
    pub count: usize,
    pub timeout: Duration,
}

#[derive(Debug, Default)]
struct MockState {
    tables: HashMap<u16, Vec<u8>>,
    failures: HashMap<u16, VecDeque<TransportStatus>>,
    next_error: Option<TransportStatus>,
    requests: Vec<Request>,
    writes: Vec<(u16, u32, Vec<u8>)>,
}

/// Cloneable handle: the session owns one clone, the test keeps another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Sets the full contents of a table (sub-tables live inside their
    /// parent's contents).
    pub fn set_table(&self, key: TableKey, data: impl Into<Vec<u8>>) {
        let data = data.into();
        let mut state = self.lock();
        if key.offset == 0 {
            state.tables.insert(key.id, data);
            return;
        }
        let start = key.offset as usize;
        let table = state.tables.entry(key.id).or_default();
        if table.len() < start + data.len() {
            table.resize(start + data.len(), 0);
        }
        table[start..start + data.len()].copy_from_slice(&data);
    }

    /// Current contents of a table, including any writes.
    pub fn table(&self, table_id: u16) -> Option<Vec<u8>> {
        self.lock().tables.get(&table_id).cloned()
    }

    /// Fails every request for `table_id` with `status` until cleared.
    pub fn fail_table(&self, table_id: u16, status: TransportStatus) {
        self.lock()
            .failures
            .entry(table_id)
            .or_default()
            .push_back(status);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Fails only the next request, whatever table it targets.
    pub fn set_next_error(&self, status: TransportStatus) {
        self.lock().next_error = Some(status);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self, operation: Operation) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    /// Number of requests of any kind issued for one table.
    pub fn count_for(&self, table_id: u16) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.table_id == table_id)
            .count()
    }

    pub fn full_reads(&self, table_id: u16) -> usize {
        self.count_where(table_id, Operation::FullRead)
    }

    pub fn offset_reads(&self, table_id: u16) -> usize {
        self.count_where(table_id, Operation::OffsetRead)
    }

    fn count_where(&self, table_id: u16, operation: Operation) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.table_id == table_id && r.operation == operation)
            .count()
    }

    /// Writes received, in order: `(table_id, offset, data)`.
    pub fn writes(&self) -> Vec<(u16, u32, Vec<u8>)> {
        self.lock().writes.clone()
    }

    pub fn reset_counters(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.writes.clear();
    }

    /// Records the request and returns the scripted failure, if any.
    fn begin(&self, request: Request) -> Result<MutexGuard<'_, MockState>, TransportStatus> {
        let mut state = self.lock();
        let table_id = request.table_id;
        state.requests.push(request);
        if let Some(status) = state.next_error.take() {
            return Err(status);
        }
        let failure = state.failures.get(&table_id).and_then(|q| q.front()).copied();
        if let Some(status) = failure {
            return Err(status);
        }
        Ok(state)
    }
}

impl TableTransport for MockTransport {
    fn full_read(&mut self, table_id: u16, timeout: Duration) -> Result<Vec<u8>, TransportStatus> {
        let state = self.begin(Request {
            operation: Operation::FullRead,
            table_id,
            offset: 0,
            count: 0,
            timeout,
        })?;
        let data = state.tables.get(&table_id).cloned();
        data.ok_or(TransportStatus::InappropriateActionRequested)
    }

    fn offset_read(
        &mut self,
        table_id: u16,
        offset: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportStatus> {
        let state = self.begin(Request {
            operation: Operation::OffsetRead,
            table_id,
            offset,
            count,
            timeout,
        })?;
        let table = state
            .tables
            .get(&table_id)
            .ok_or(TransportStatus::InappropriateActionRequested)?;
        let start = offset as usize;
        if start > table.len() {
            return Err(TransportStatus::InappropriateActionRequested);
        }
        let end = (start + count).min(table.len());
        Ok(table[start..end].to_vec())
    }

    fn full_write(
        &mut self,
        table_id: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportStatus> {
        let mut state = self.begin(Request {
            operation: Operation::FullWrite,
            table_id,
            offset: 0,
            count: data.len(),
            timeout,
        })?;
        state.tables.insert(table_id, data.to_vec());
        state.writes.push((table_id, 0, data.to_vec()));
        Ok(())
    }

    fn offset_write(
        &mut self,
        table_id: u16,
        offset: u32,
        data: &[u8],
        timeout: Duration,
    ) -> Result<(), TransportStatus> {
        let mut state = self.begin(Request {
            operation: Operation::OffsetWrite,
            table_id,
            offset,
            count: data.len(),
            timeout,
        })?;
        let start = offset as usize;
        let table = state.tables.entry(table_id).or_default();
        if table.len() < start + data.len() {
            table.resize(start + data.len(), 0);
        }
        table[start..start + data.len()].copy_from_slice(data);
        state.writes.push((table_id, offset, data.to_vec()));
        Ok(())
    }
}
