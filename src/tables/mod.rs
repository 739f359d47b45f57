//! # Table Set
//!
//! Concrete table definitions and a catalog that decodes any known table by
//! key without naming its type, used by the command-line tool.

pub mod mfg;
pub mod records;
pub mod standard;

use crate::error::TableResult;
use crate::table::{TableDefinition, TableKey, TableSession};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A table decoded through the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    pub key: TableKey,
    pub name: &'static str,
    pub debug: String,
    pub json: serde_json::Value,
}

type DecodeFn = fn(&TableSession) -> TableResult<DecodedTable>;

#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub key: TableKey,
    pub name: &'static str,
    decode: DecodeFn,
}

impl CatalogEntry {
    pub fn decode(&self, session: &TableSession) -> TableResult<DecodedTable> {
        (self.decode)(session)
    }
}

fn decode_entry<T>(session: &TableSession) -> TableResult<DecodedTable>
where
    T: TableDefinition + Serialize + Debug,
{
    let table = session.table::<T>()?;
    let json = serde_json::to_value(&*table).map_err(crate::psem::CaptureError::from)?;
    Ok(DecodedTable {
        key: T::KEY,
        name: T::NAME,
        debug: format!("{table:#?}"),
        json,
    })
}

fn entry<T>() -> (TableKey, CatalogEntry)
where
    T: TableDefinition + Serialize + Debug,
{
    (
        T::KEY,
        CatalogEntry {
            key: T::KEY,
            name: T::NAME,
            decode: decode_entry::<T>,
        },
    )
}

/// Every table this crate can decode, in table order.
pub static CATALOG: Lazy<BTreeMap<TableKey, CatalogEntry>> = Lazy::new(|| {
    BTreeMap::from([
        entry::<standard::GeneralConfig>(),
        entry::<standard::ManufacturerIdent>(),
        entry::<standard::EndDeviceStatus>(),
        entry::<standard::ActualRegisters>(),
        entry::<standard::DataSelection>(),
        entry::<standard::CurrentRegisterData>(),
        entry::<standard::PreviousSeasonData>(),
        entry::<standard::PreviousDemandResetData>(),
        entry::<standard::SelfReadData>(),
        entry::<standard::PresentRegisterSelect>(),
        entry::<standard::PresentRegisterData>(),
        entry::<standard::Clock>(),
        entry::<mfg::MetrologyBlurt>(),
        entry::<mfg::DeviceStatus>(),
        entry::<mfg::CommModuleStatus>(),
    ])
});

pub fn lookup(key: TableKey) -> Option<&'static CatalogEntry> {
    CATALOG.get(&key)
}
