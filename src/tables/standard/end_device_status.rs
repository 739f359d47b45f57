//! ST3 End Device Mode and Status Table.

use crate::codec::TableReader;
use crate::constants::ST_END_DEVICE_STATUS;
use crate::error::{DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::tables::standard::general_config::GeneralConfig;
use crate::util::BitSet;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EdMode: u8 {
        const METERING = 0x01;
        const TEST_MODE = 0x02;
        const METER_SHOP_MODE = 0x04;
        const FACTORY = 0x08;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EdStdStatus1: u16 {
        const UNPROGRAMMED = 0x0001;
        const CONFIGURATION_ERROR = 0x0002;
        const SELF_CHK_ERROR = 0x0004;
        const RAM_FAILURE = 0x0008;
        const ROM_FAILURE = 0x0010;
        const NONVOL_MEM_FAILURE = 0x0020;
        const CLOCK_ERROR = 0x0040;
        const MEASUREMENT_ERROR = 0x0080;
        const LOW_BATTERY = 0x0100;
        const LOW_LOSS_POTENTIAL = 0x0200;
        const DEMAND_OVERLOAD = 0x0400;
        const POWER_FAILURE = 0x0800;
        const TAMPER_DETECT = 0x1000;
        const REVERSE_ROTATION = 0x2000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndDeviceStatus {
    pub ed_mode: EdMode,
    pub ed_std_status1: EdStdStatus1,
    pub ed_std_status2: u8,
    /// Manufacturer status bits; absent when ST0 declares none.
    pub ed_mfg_status: Option<BitSet>,
}

impl EndDeviceStatus {
    pub fn has_errors(&self) -> bool {
        let errors = EdStdStatus1::CONFIGURATION_ERROR
            | EdStdStatus1::SELF_CHK_ERROR
            | EdStdStatus1::RAM_FAILURE
            | EdStdStatus1::ROM_FAILURE
            | EdStdStatus1::NONVOL_MEM_FAILURE
            | EdStdStatus1::CLOCK_ERROR
            | EdStdStatus1::MEASUREMENT_ERROR;
        self.ed_std_status1.intersects(errors)
    }
}

impl TableDefinition for EndDeviceStatus {
    /// DIM_MFG_STATUS_USED from ST0.
    type Deps = u8;
    const KEY: TableKey = TableKey::standard(ST_END_DEVICE_STATUS);
    const NAME: &'static str = "End Device Mode and Status";

    fn dependencies(session: &TableSession) -> TableResult<u8> {
        Ok(session.table::<GeneralConfig>()?.dim_mfg_status_used)
    }

    fn decode(r: &mut TableReader<'_>, dim_mfg_status_used: &u8) -> DecodeResult<Self> {
        Ok(Self {
            ed_mode: EdMode::from_bits_retain(r.u8()?),
            ed_std_status1: EdStdStatus1::from_bits_retain(r.u16()?),
            ed_std_status2: r.u8()?,
            ed_mfg_status: r.bit_set(usize::from(*dim_mfg_status_used) * 8)?,
        })
    }
}
