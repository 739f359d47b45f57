//! # Table Session
//!
//! `TableSession` is the registry every table is read through. It owns the
//! transport and holds one slot per [`TableKey`] with the table's state, its
//! last decoded snapshot and the raw bytes that snapshot came from.
//!
//! ## Read protocol
//!
//! 1. Resolve prerequisites (`TableDefinition::dependencies`), which may read
//!    other tables first.
//! 2. Resolve the size policy from those prerequisites.
//! 3. Fetch: a full read for standalone tables, an offset read for sub-tables.
//! 4. Decode into a fresh snapshot. The slot is replaced only when the whole
//!    decode succeeded; any error leaves the slot as it was.
//!
//! Sessions use `Rc`/`RefCell` and are therefore neither `Send` nor `Sync`:
//! one session serves one serial link to one device.

use super::{encode_table, DeviceProfile, SessionConfig, SizePolicy, TableDefinition, TableKey, TableState};
use crate::codec::TableReader;
use crate::error::{DecodeResult, TableError, TableResult, TransportStatus};
use crate::psem::{OfflineTransport, TableTransport};
use crate::util::hex::{encode_hex, log_table_hex};
use log::{debug, info, trace, warn};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Slot {
    state: TableState,
    snapshot: Option<Rc<dyn Any>>,
    raw: Option<Rc<[u8]>>,
}

/// Byte range of one field inside a table, read on its own with an offset
/// read. Field reads never change the table's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub table: TableKey,
    pub name: &'static str,
    /// Offset from the start of `table`.
    pub offset: u32,
    pub len: usize,
    /// Timeout hint of the owning table; the session default when `None`.
    pub timeout: Option<Duration>,
}

impl FieldSlot {
    pub const fn new(table: TableKey, name: &'static str, offset: u32, len: usize) -> Self {
        Self {
            table,
            name,
            offset,
            len,
            timeout: None,
        }
    }

    /// A field of `T`, read with `T`'s timeout hint.
    pub const fn of<T: TableDefinition>(name: &'static str, offset: u32, len: usize) -> Self {
        Self {
            table: T::KEY,
            name,
            offset,
            len,
            timeout: T::TIMEOUT,
        }
    }
}

pub struct TableSession {
    transport: RefCell<Box<dyn TableTransport>>,
    config: SessionConfig,
    slots: RefCell<HashMap<TableKey, Slot>>,
    seeds: RefCell<HashMap<TableKey, Rc<[u8]>>>,
}

impl TableSession {
    pub fn new(transport: impl TableTransport + 'static) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: impl TableTransport + 'static, config: SessionConfig) -> Self {
        Self {
            transport: RefCell::new(Box::new(transport)),
            config,
            slots: RefCell::new(HashMap::new()),
            seeds: RefCell::new(HashMap::new()),
        }
    }

    /// A session with no device; only seeded or captured buffers decode.
    pub fn offline(config: SessionConfig) -> Self {
        Self::with_config(OfflineTransport, config)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.config.profile
    }

    pub fn is_connected(&self) -> bool {
        self.transport.borrow().is_connected()
    }

    fn timeout_for<T: TableDefinition>(&self) -> Duration {
        T::TIMEOUT.unwrap_or_else(|| self.config.default_timeout())
    }

    /// Returns the decoded table, reading it first if it is not loaded.
    ///
    /// Loaded tables are served from the cache without a fetch, except live
    /// tables, which are fetched on every call while the transport is
    /// connected. A seeded buffer is decoded instead of fetching.
    pub fn table<T: TableDefinition>(&self) -> TableResult<Rc<T>> {
        let live = T::LIVE && self.is_connected();
        if !live {
            if let Some(snapshot) = self.snapshot::<T>() {
                trace!("{} cache hit", T::KEY);
                return Ok(snapshot);
            }
        }

        let seed = self.seeds.borrow().get(&T::KEY).cloned();
        if let Some(bytes) = seed {
            debug!("{} ({}) decoding seeded buffer", T::KEY, T::NAME);
            return self.load_captured::<T>(&bytes);
        }

        self.read::<T>()
    }

    /// Fetches and decodes the table regardless of its state.
    pub fn read<T: TableDefinition>(&self) -> TableResult<Rc<T>> {
        let deps = T::dependencies(self)?;
        let policy = T::size(&deps)?;
        debug!("{} ({}) size {:?}", T::KEY, T::NAME, policy);

        let bytes = self.fetch(T::KEY, policy, self.timeout_for::<T>())?;
        let table = self.decode_buffer::<T>(&bytes, &deps, policy)?;
        Ok(self.store(T::KEY, table, Rc::from(bytes)))
    }

    /// Decodes a previously captured buffer. The table becomes `Loaded`
    /// without any transport request.
    pub fn load_captured<T: TableDefinition>(&self, bytes: &[u8]) -> TableResult<Rc<T>> {
        let deps = T::dependencies(self)?;
        let policy = T::size(&deps)?;
        let table = self.decode_buffer::<T>(bytes, &deps, policy)?;
        Ok(self.store(T::KEY, table, Rc::from(bytes)))
    }

    /// Registers captured bytes for `key`, decoded on first access.
    pub fn seed(&self, key: TableKey, bytes: impl Into<Vec<u8>>) {
        let bytes: Rc<[u8]> = Rc::from(bytes.into());
        debug!("{key} seeded with {} bytes", bytes.len());
        self.seeds.borrow_mut().insert(key, bytes);
    }

    /// Reads one field with an offset read. Offline sessions slice the field
    /// out of the captured buffer instead.
    pub fn read_field(&self, field: FieldSlot) -> TableResult<Vec<u8>> {
        let key = field.table;
        let start = field.offset as usize;

        if !self.is_connected() {
            let raw = self.raw_bytes(key).ok_or(TableError::TransportFailure {
                table: key,
                status: TransportStatus::CommunicationError,
            })?;
            return raw
                .get(start..start + field.len)
                .map(<[u8]>::to_vec)
                .ok_or_else(|| TableError::TruncatedData {
                    table: key,
                    offset: start,
                    needed: field.len,
                    available: raw.len().saturating_sub(start),
                });
        }

        let result = self.transport.borrow_mut().offset_read(
            key.id,
            key.offset + field.offset,
            field.len,
            field.timeout.unwrap_or_else(|| self.config.default_timeout()),
        );
        let bytes = result.map_err(|status| {
            warn!("{key} field {} read failed: {status}", field.name);
            TableError::TransportFailure { table: key, status }
        })?;
        trace!("{key} field {} = {}", field.name, encode_hex(&bytes));

        if bytes.len() < field.len {
            return Err(TableError::TruncatedData {
                table: key,
                offset: start,
                needed: field.len,
                available: bytes.len(),
            });
        }
        Ok(bytes)
    }

    /// Reads one field and decodes it.
    pub fn read_field_with<V>(
        &self,
        field: FieldSlot,
        decode: impl FnOnce(&mut TableReader<'_>) -> DecodeResult<V>,
    ) -> TableResult<V> {
        let bytes = self.read_field(field)?;
        let mut reader = TableReader::new(&bytes);
        decode(&mut reader).map_err(|err| TableError::decode(field.table, err))
    }

    /// Encodes the table and writes it to the device. A loaded table expires
    /// so the next access reads back what the device stored.
    pub fn write<T: TableDefinition>(&self, table: &T) -> TableResult<()> {
        let key = T::KEY;
        let deps = T::dependencies(self)?;
        let bytes = encode_table(table, &deps)?;
        let timeout = self.timeout_for::<T>();

        let result = {
            let mut transport = self.transport.borrow_mut();
            if key.is_sub_table() {
                transport.offset_write(key.id, key.offset, &bytes, timeout)
            } else {
                transport.full_write(key.id, &bytes, timeout)
            }
        };
        result.map_err(|status| TableError::TransportFailure { table: key, status })?;

        info!("{key} ({}) written, {} bytes", T::NAME, bytes.len());
        self.invalidate_key(key);
        Ok(())
    }

    pub fn invalidate<T: TableDefinition>(&self) {
        self.invalidate_key(T::KEY);
    }

    /// Marks a loaded table expired; the next access reads it again.
    pub fn invalidate_key(&self, key: TableKey) {
        if let Some(slot) = self.slots.borrow_mut().get_mut(&key) {
            if slot.state == TableState::Loaded {
                debug!("{key} expired");
                slot.state = TableState::Expired;
            }
        }
    }

    pub fn invalidate_all(&self) {
        for (key, slot) in self.slots.borrow_mut().iter_mut() {
            if slot.state == TableState::Loaded {
                debug!("{key} expired");
                slot.state = TableState::Expired;
            }
        }
    }

    pub fn state<T: TableDefinition>(&self) -> TableState {
        self.state_of(T::KEY)
    }

    pub fn state_of(&self, key: TableKey) -> TableState {
        self.slots
            .borrow()
            .get(&key)
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    /// Resolves prerequisites and returns the table's size policy.
    pub fn size_of<T: TableDefinition>(&self) -> TableResult<SizePolicy> {
        let deps = T::dependencies(self)?;
        T::size(&deps)
    }

    /// Bytes the current snapshot was decoded from, or the seeded buffer.
    pub fn raw_bytes(&self, key: TableKey) -> Option<Rc<[u8]>> {
        let raw = self.slots.borrow().get(&key).and_then(|slot| slot.raw.clone());
        raw.or_else(|| self.seeds.borrow().get(&key).cloned())
    }

    /// Keys of every loaded table, in table order.
    pub fn loaded_tables(&self) -> Vec<TableKey> {
        let mut keys: Vec<TableKey> = self
            .slots
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.state == TableState::Loaded)
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Every raw buffer the session holds, decoded or only seeded.
    pub fn raw_tables(&self) -> Vec<(TableKey, Rc<[u8]>)> {
        let mut tables: HashMap<TableKey, Rc<[u8]>> = self.seeds.borrow().clone();
        for (key, slot) in self.slots.borrow().iter() {
            if let Some(raw) = &slot.raw {
                tables.insert(*key, Rc::clone(raw));
            }
        }
        let mut tables: Vec<_> = tables.into_iter().collect();
        tables.sort_by_key(|(key, _)| *key);
        tables
    }

    fn snapshot<T: TableDefinition>(&self) -> Option<Rc<T>> {
        let slots = self.slots.borrow();
        let slot = slots.get(&T::KEY)?;
        if slot.state != TableState::Loaded {
            return None;
        }
        slot.snapshot.clone()?.downcast::<T>().ok()
    }

    fn fetch(&self, key: TableKey, policy: SizePolicy, timeout: Duration) -> TableResult<Vec<u8>> {
        let result = {
            let mut transport = self.transport.borrow_mut();
            if key.is_sub_table() {
                transport.offset_read(key.id, key.offset, policy.minimum(), timeout)
            } else {
                transport.full_read(key.id, timeout)
            }
        };

        match result {
            Ok(bytes) => {
                debug!("{key} fetched {} bytes", bytes.len());
                log_table_hex(&key.to_string(), &bytes);
                Ok(bytes)
            }
            Err(status) => {
                warn!("{key} read failed: {status}");
                Err(TableError::TransportFailure { table: key, status })
            }
        }
    }

    fn decode_buffer<T: TableDefinition>(
        &self,
        bytes: &[u8],
        deps: &T::Deps,
        policy: SizePolicy,
    ) -> TableResult<T> {
        let key = T::KEY;
        let body = match policy {
            SizePolicy::Fixed(len) if bytes.len() > len => {
                if self.config.strict_fixed_size {
                    return Err(TableError::DecodeInconsistency {
                        table: key,
                        offset: len,
                        detail: format!("{} bytes returned for a {len}-byte table", bytes.len()),
                    });
                }
                warn!("{key} returned {} bytes, expected {len}; ignoring the tail", bytes.len());
                &bytes[..len]
            }
            _ => bytes,
        };

        let mut reader = TableReader::new(body);
        let table = T::decode(&mut reader, deps).map_err(|err| TableError::decode(key, err))?;

        if let Some(at) = reader.first_absent_section() {
            debug!(
                "{key} decoded {} of {} bytes, optional sections from offset {at} absent",
                reader.position(),
                body.len()
            );
        } else if reader.remaining() > 0 {
            debug!("{key} left {} trailing bytes undecoded", reader.remaining());
        }
        Ok(table)
    }

    fn store<T: TableDefinition>(&self, key: TableKey, table: T, raw: Rc<[u8]>) -> Rc<T> {
        let snapshot = Rc::new(table);
        let any: Rc<dyn Any> = snapshot.clone();
        {
            let mut slots = self.slots.borrow_mut();
            let slot = slots.entry(key).or_default();
            slot.state = TableState::Loaded;
            slot.snapshot = Some(any);
            slot.raw = Some(raw);
        }
        self.seeds.borrow_mut().remove(&key);
        debug!("{key} ({}) loaded", T::NAME);
        snapshot
    }
}

impl std::fmt::Debug for TableSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSession")
            .field("config", &self.config)
            .field("loaded", &self.loaded_tables())
            .finish_non_exhaustive()
    }
}
