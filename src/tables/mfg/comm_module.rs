//! MT100 Comm Module, status sub-table at offset 128.
//!
//! Counters and the MAC address change independently of the rest of the
//! table; the field slots below read them with offset reads without touching
//! the cached snapshot.

use crate::codec::TableReader;
use crate::constants::{MT_COMM_MODULE, MT_COMM_MODULE_STATUS_OFFSET};
use crate::error::{DecodeResult, TableResult};
use crate::table::{Dialect, FieldSlot, TableDefinition, TableKey, TableSession};
use serde::Serialize;

pub const COMM_MODULE: TableKey = TableKey::manufacturer(MT_COMM_MODULE);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkState {
    Down,
    Joining,
    Up,
    Other(u8),
}

impl From<u8> for LinkState {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Self::Down,
            1 => Self::Joining,
            2 => Self::Up,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommModuleStatus {
    pub mac_address: [u8; 8],
    pub link_state: LinkState,
    pub rx_packets: u32,
    pub tx_packets: u32,
    /// dBm.
    pub rssi: i8,
    pub link_quality: u8,
    /// C12.22 relay the module is registered through.
    pub relay_native_address: Option<[u8; 8]>,
}

impl CommModuleStatus {
    pub const MAC_ADDRESS: FieldSlot = FieldSlot::of::<Self>("MAC_ADDRESS", 0, 8);
    pub const RX_PACKETS: FieldSlot = FieldSlot::of::<Self>("RX_PACKETS", 9, 4);
    pub const TX_PACKETS: FieldSlot = FieldSlot::of::<Self>("TX_PACKETS", 13, 4);

    pub fn read_mac_address(session: &TableSession) -> TableResult<[u8; 8]> {
        session.read_field_with(Self::MAC_ADDRESS, |r| r.array_of::<8>())
    }

    pub fn read_rx_packets(session: &TableSession) -> TableResult<u32> {
        session.read_field_with(Self::RX_PACKETS, |r| r.u32())
    }

    pub fn read_tx_packets(session: &TableSession) -> TableResult<u32> {
        session.read_field_with(Self::TX_PACKETS, |r| r.u32())
    }

    /// MAC address as colon-separated hex.
    pub fn mac_string(&self) -> String {
        self.mac_address
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl TableDefinition for CommModuleStatus {
    type Deps = Dialect;
    const KEY: TableKey = TableKey::sub_table(COMM_MODULE, MT_COMM_MODULE_STATUS_OFFSET);
    const NAME: &'static str = "Comm Module Status";

    fn dependencies(session: &TableSession) -> TableResult<Dialect> {
        Ok(session.profile().dialect)
    }

    fn decode(r: &mut TableReader<'_>, dialect: &Dialect) -> DecodeResult<Self> {
        let mac_address = r.array_of::<8>()?;
        let link_state = LinkState::from(r.u8()?);
        let rx_packets = r.u32()?;
        let tx_packets = r.u32()?;
        let rssi = r.i8()?;
        let link_quality = r.u8()?;
        r.skip(1)?;
        let relay_native_address = match dialect {
            Dialect::C1222 => Some(r.array_of::<8>()?),
            Dialect::C1218 => None,
        };
        Ok(Self {
            mac_address,
            link_state,
            rx_packets,
            tx_packets,
            rssi,
            link_quality,
            relay_native_address,
        })
    }
}
