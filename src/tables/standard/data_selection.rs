//! ST22 Data Selection Table: the source selectors behind each summation,
//! demand and coincident register of ST23.

use crate::codec::{TableReader, TableWriter};
use crate::constants::ST_DATA_SELECTION;
use crate::error::{DecodeResult, TableError, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::tables::standard::actual_register::ActualRegisters;
use crate::util::BitSet;
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSelection {
    pub summation_select: Option<Vec<u8>>,
    pub demand_select: Option<Vec<u8>>,
    /// One bit per demand: set for maximum, clear for minimum.
    pub min_or_max_flags: Option<BitSet>,
    pub coincident_select: Option<Vec<u8>>,
    pub coin_demand_assoc: Option<Vec<u8>>,
}

impl DataSelection {
    /// Whether demand `index` tracks a maximum.
    pub fn is_maximum(&self, index: usize) -> bool {
        self.min_or_max_flags
            .as_ref()
            .is_some_and(|flags| index < flags.len() && flags.get(index))
    }
}

fn select(r: &mut TableReader<'_>, count: u8) -> DecodeResult<Option<Vec<u8>>> {
    r.array(usize::from(count), |r| r.u8())
}

fn write_selectors(
    w: &mut TableWriter,
    field: &'static str,
    values: &Option<Vec<u8>>,
    expected: u8,
) -> TableResult<()> {
    let len = values.as_ref().map_or(0, Vec::len);
    if len != usize::from(expected) {
        return Err(TableError::InvalidValue {
            table: DataSelection::KEY,
            field,
            detail: format!("{len} entries, ST21 declares {expected}"),
        });
    }
    if let Some(values) = values {
        w.bytes(values);
    }
    Ok(())
}

impl TableDefinition for DataSelection {
    type Deps = Rc<ActualRegisters>;
    const KEY: TableKey = TableKey::standard(ST_DATA_SELECTION);
    const NAME: &'static str = "Data Selection";

    fn dependencies(session: &TableSession) -> TableResult<Self::Deps> {
        session.table::<ActualRegisters>()
    }

    fn decode(r: &mut TableReader<'_>, regs: &Self::Deps) -> DecodeResult<Self> {
        Ok(Self {
            summation_select: select(r, regs.nbr_summations)?,
            demand_select: select(r, regs.nbr_demands)?,
            min_or_max_flags: r.bit_set(usize::from(regs.nbr_demands))?,
            coincident_select: select(r, regs.nbr_coin_values)?,
            coin_demand_assoc: select(r, regs.nbr_coin_values)?,
        })
    }

    fn encode(&self, w: &mut TableWriter, regs: &Self::Deps) -> TableResult<()> {
        write_selectors(w, "SUMMATION_SELECT", &self.summation_select, regs.nbr_summations)?;
        write_selectors(w, "DEMAND_SELECT", &self.demand_select, regs.nbr_demands)?;
        match &self.min_or_max_flags {
            Some(flags) if flags.len() == usize::from(regs.nbr_demands) => {
                w.bit_set(flags);
            }
            None if regs.nbr_demands == 0 => {}
            _ => {
                return Err(TableError::InvalidValue {
                    table: Self::KEY,
                    field: "MIN_OR_MAX_FLAGS",
                    detail: format!("expected {} flags", regs.nbr_demands),
                })
            }
        }
        write_selectors(w, "COINCIDENT_SELECT", &self.coincident_select, regs.nbr_coin_values)?;
        write_selectors(w, "COIN_DEMAND_ASSOC", &self.coin_demand_assoc, regs.nbr_coin_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{encode_table, SizePolicy};

    fn regs(summations: u8, demands: u8, coin: u8) -> Rc<ActualRegisters> {
        let bytes = [0, 0, 0, summations, demands, coin, 0, 0, 0, 0];
        Rc::new(ActualRegisters::from_bytes(&bytes, &()).unwrap())
    }

    #[test]
    fn test_size_rounds_flags_up() {
        assert_eq!(DataSelection::size(&regs(0, 2, 0)).unwrap(), SizePolicy::Fixed(3));
        assert_eq!(DataSelection::size(&regs(1, 9, 2)).unwrap(), SizePolicy::Fixed(1 + 9 + 2 + 4));
    }

    #[test]
    fn test_encode_checks_counts() {
        let deps = regs(0, 2, 0);
        let table = DataSelection::from_bytes(&[0x10, 0x11, 0b10], &deps).unwrap();
        assert!(table.is_maximum(1));
        assert!(!table.is_maximum(0));
        assert_eq!(encode_table(&table, &deps).unwrap(), vec![0x10, 0x11, 0b10]);

        let mut short = table.clone();
        short.demand_select = Some(vec![0x10]);
        assert!(matches!(
            encode_table(&short, &deps),
            Err(TableError::InvalidValue { field: "DEMAND_SELECT", .. })
        ));
    }
}
