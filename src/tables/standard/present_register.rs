//! ST27 Present Register Selection and ST28 Present Register Data.
//!
//! ST28 holds instantaneous values and is always read fresh.

use crate::codec::{measure, TableReader, TableWriter};
use crate::constants::{ST_PRESENT_REGISTER_DATA, ST_PRESENT_REGISTER_SELECT};
use crate::error::{DecodeResult, TableError, TableResult};
use crate::table::{FieldSlot, TableDefinition, TableKey, TableSession};
use crate::tables::records::RegisterLayout;
use crate::tables::standard::actual_register::{ActualRegisters, RegFunc1};
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentRegisterSelect {
    pub present_demand_select: Option<Vec<u8>>,
    pub present_value_select: Option<Vec<u8>>,
}

impl TableDefinition for PresentRegisterSelect {
    type Deps = Rc<ActualRegisters>;
    const KEY: TableKey = TableKey::standard(ST_PRESENT_REGISTER_SELECT);
    const NAME: &'static str = "Present Register Selection";

    fn dependencies(session: &TableSession) -> TableResult<Self::Deps> {
        session.table::<ActualRegisters>()
    }

    fn decode(r: &mut TableReader<'_>, regs: &Self::Deps) -> DecodeResult<Self> {
        Ok(Self {
            present_demand_select: r.array(usize::from(regs.nbr_present_demands), |r| r.u8())?,
            present_value_select: r.array(usize::from(regs.nbr_present_values), |r| r.u8())?,
        })
    }

    fn encode(&self, w: &mut TableWriter, regs: &Self::Deps) -> TableResult<()> {
        let sections = [
            ("PRESENT_DEMAND_SELECT", &self.present_demand_select, regs.nbr_present_demands),
            ("PRESENT_VALUE_SELECT", &self.present_value_select, regs.nbr_present_values),
        ];
        for (field, values, expected) in sections {
            let values = values.as_deref().unwrap_or_default();
            if values.len() != usize::from(expected) {
                return Err(TableError::InvalidValue {
                    table: Self::KEY,
                    field,
                    detail: format!("{} entries, ST21 declares {expected}", values.len()),
                });
            }
            w.bytes(values);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentDemand {
    /// Seconds left in the demand interval, when ST21 includes it.
    pub time_remaining: Option<u32>,
    pub demand_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentRegisterData {
    pub present_demands: Option<Vec<PresentDemand>>,
    pub present_values: Option<Vec<f64>>,
}

impl PresentRegisterData {
    /// Byte range of present value `index`, the last section of the table.
    pub fn value_slot(layout: &RegisterLayout, index: usize) -> TableResult<FieldSlot> {
        let count = usize::from(layout.registers.nbr_present_values);
        if index >= count {
            return Err(TableError::InvalidValue {
                table: Self::KEY,
                field: "PRESENT_VALUE",
                detail: format!("index {index}, ST21 declares {count} present values"),
            });
        }
        let width = layout.formats.ni1.width();
        let size = measure(|r| Self::decode(r, layout).map(drop))
            .map_err(|err| TableError::decode(Self::KEY, err))?
            .len;
        let offset = size - (count - index) * width;
        Ok(FieldSlot::of::<Self>("PRESENT_VALUE", offset as u32, width))
    }

    /// Reads one present value with an offset read.
    pub fn read_present_value(session: &TableSession, index: usize) -> TableResult<f64> {
        let layout = Self::dependencies(session)?;
        let slot = Self::value_slot(&layout, index)?;
        session.read_field_with(slot, |r| r.ni(layout.formats.ni1))
    }
}

impl TableDefinition for PresentRegisterData {
    type Deps = RegisterLayout;
    const KEY: TableKey = TableKey::standard(ST_PRESENT_REGISTER_DATA);
    const NAME: &'static str = "Present Register Data";
    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(2));
    const LIVE: bool = true;

    fn dependencies(session: &TableSession) -> TableResult<RegisterLayout> {
        RegisterLayout::resolve(session)
    }

    fn decode(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let regs = &layout.registers;
        let formats = layout.formats;
        let with_time = regs.reg_func1.contains(RegFunc1::TIME_REMAINING);

        let present_demands = r.array(usize::from(regs.nbr_present_demands), |r| {
            let time_remaining = match with_time {
                true => r.time_of_day(formats.time)?,
                false => None,
            };
            Ok(PresentDemand {
                time_remaining,
                demand_value: r.ni(formats.ni2)?,
            })
        })?;
        Ok(Self {
            present_demands,
            present_values: r.array(usize::from(regs.nbr_present_values), |r| r.ni(formats.ni1))?,
        })
    }
}
