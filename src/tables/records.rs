//! # Register Records
//!
//! Sub-structures repeated inside the register data tables (ST23 to ST26).
//! They are not addressable on their own: their presence and widths follow
//! the ST0 data formats and the ST21 feature flags and counts, bundled here
//! as a [`RegisterLayout`].
//!
//! Field order is fixed by the wire format and there are no tags, so each
//! `parse` reads its fields in exactly the listed order. Sizes are measured
//! from `parse`.

use crate::codec::{measure, NiFormat, TableReader, TimeFormat};
use crate::error::{DecodeResult, TableResult};
use crate::table::TableSession;
use crate::tables::standard::actual_register::{ActualRegisters, RegFunc1};
use crate::tables::standard::general_config::session_formats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Encodings selected in ST0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataFormats {
    pub time: TimeFormat,
    pub ni1: NiFormat,
    pub ni2: NiFormat,
}

/// Everything a register record needs to know about its own layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLayout {
    pub formats: DataFormats,
    pub registers: Rc<ActualRegisters>,
}

impl RegisterLayout {
    pub fn new(formats: DataFormats, registers: ActualRegisters) -> Self {
        Self {
            formats,
            registers: Rc::new(registers),
        }
    }

    /// Loads ST0 and ST21 from the session.
    pub fn resolve(session: &TableSession) -> TableResult<Self> {
        let formats = session_formats(session)?;
        let registers = session.table::<ActualRegisters>()?;
        Ok(Self { formats, registers })
    }

    fn has(&self, flag: RegFunc1) -> bool {
        self.registers.reg_func1.contains(flag)
    }

    fn occurrences(&self) -> usize {
        usize::from(self.registers.nbr_occur)
    }
}

/// A sub-structure decoded with a [`RegisterLayout`].
pub trait Record: Sized {
    fn parse(reader: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self>;

    /// Encoded size under `layout`.
    fn size(layout: &RegisterLayout) -> DecodeResult<usize> {
        measure(|reader| Self::parse(reader, layout).map(drop)).map(|measured| measured.len)
    }
}

/// One demand: when the maxima occurred, cumulative values, and the maxima.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRecord {
    pub event_times: Option<Vec<Option<DateTime<Utc>>>>,
    pub cum_demand: Option<f64>,
    pub cont_cum_demand: Option<f64>,
    pub demands: Option<Vec<f64>>,
}

impl Record for DemandRecord {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let DataFormats { time, ni1, ni2 } = layout.formats;
        let occur = layout.occurrences();

        let event_times = if layout.has(RegFunc1::DATE_TIME) {
            r.array(occur, |r| r.stime(time))?
        } else {
            None
        };
        let cum_demand = match layout.has(RegFunc1::CUM_DEMAND) {
            true => Some(r.ni(ni1)?),
            false => None,
        };
        let cont_cum_demand = match layout.has(RegFunc1::CONT_CUM_DEMAND) {
            true => Some(r.ni(ni1)?),
            false => None,
        };
        let demands = r.array(occur, |r| r.ni(ni2))?;

        Ok(Self {
            event_times,
            cum_demand,
            cont_cum_demand,
            demands,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoincidentRecord {
    pub coincident_values: Option<Vec<f64>>,
}

impl Record for CoincidentRecord {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let ni2 = layout.formats.ni2;
        Ok(Self {
            coincident_values: r.array(layout.occurrences(), |r| r.ni(ni2))?,
        })
    }
}

/// Summations, demands and coincident values of one tier (or the total).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataBlock {
    pub summations: Option<Vec<f64>>,
    pub demands: Option<Vec<DemandRecord>>,
    pub coincidents: Option<Vec<CoincidentRecord>>,
}

impl Record for DataBlock {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let regs = &layout.registers;
        let ni1 = layout.formats.ni1;
        Ok(Self {
            summations: r.array(usize::from(regs.nbr_summations), |r| r.ni(ni1))?,
            demands: r.array(usize::from(regs.nbr_demands), |r| DemandRecord::parse(r, layout))?,
            coincidents: r.array(usize::from(regs.nbr_coin_values), |r| {
                CoincidentRecord::parse(r, layout)
            })?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterData {
    pub nbr_demand_resets: Option<u8>,
    pub tot_data_block: DataBlock,
    pub tier_data_blocks: Option<Vec<DataBlock>>,
}

impl Record for RegisterData {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let nbr_demand_resets = match layout.has(RegFunc1::DEMAND_RESET_CTR) {
            true => Some(r.u8()?),
            false => None,
        };
        Ok(Self {
            nbr_demand_resets,
            tot_data_block: DataBlock::parse(r, layout)?,
            tier_data_blocks: r.array(usize::from(layout.registers.nbr_tiers), |r| {
                DataBlock::parse(r, layout)
            })?,
        })
    }
}

/// Register data preceded by when it was frozen (ST24, ST25).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterSnapshot {
    pub end_date_time: Option<DateTime<Utc>>,
    pub season: Option<u8>,
    pub register_data: RegisterData,
}

impl Record for RegisterSnapshot {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let end_date_time = match layout.has(RegFunc1::DATE_TIME) {
            true => r.stime(layout.formats.time)?,
            false => None,
        };
        let season = match layout.has(RegFunc1::SEASON_INFO) {
            true => Some(r.u8()?),
            false => None,
        };
        Ok(Self {
            end_date_time,
            season,
            register_data: RegisterData::parse(r, layout)?,
        })
    }
}

/// One entry of the self-read list (ST26).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfReadRecord {
    pub self_read_seq_nbr: Option<u16>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub season: Option<u8>,
    pub register_data: RegisterData,
}

impl Record for SelfReadRecord {
    fn parse(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let self_read_seq_nbr = match layout.registers.include_self_read_seq_nbr() {
            true => Some(r.u16()?),
            false => None,
        };
        let RegisterSnapshot {
            end_date_time,
            season,
            register_data,
        } = RegisterSnapshot::parse(r, layout)?;
        Ok(Self {
            self_read_seq_nbr,
            end_date_time,
            season,
            register_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TableWriter;
    use crate::tables::standard::actual_register::RegFunc1;

    fn registers(reg_func1: RegFunc1, summations: u8, demands: u8, coin: u8, occur: u8, tiers: u8) -> ActualRegisters {
        ActualRegisters {
            reg_func1,
            reg_func2_raw: 0,
            nbr_self_reads: 0,
            nbr_summations: summations,
            nbr_demands: demands,
            nbr_coin_values: coin,
            nbr_occur: occur,
            nbr_tiers: tiers,
            nbr_present_demands: 0,
            nbr_present_values: 0,
        }
    }

    fn formats() -> DataFormats {
        DataFormats {
            time: TimeFormat::SecondsSinceEpoch,
            ni1: NiFormat::Int32,
            ni2: NiFormat::Int24,
        }
    }

    #[test]
    fn test_demand_record_size_terms() {
        let flags = RegFunc1::DATE_TIME | RegFunc1::CUM_DEMAND;
        let layout = RegisterLayout::new(formats(), registers(flags, 0, 1, 0, 2, 0));
        // 2 event times (4) + cum demand (4) + 2 demands (3)
        assert_eq!(DemandRecord::size(&layout).unwrap(), 2 * 4 + 4 + 2 * 3);

        let layout = RegisterLayout::new(formats(), registers(RegFunc1::empty(), 0, 1, 0, 2, 0));
        assert_eq!(DemandRecord::size(&layout).unwrap(), 2 * 3);
    }

    #[test]
    fn test_register_data_nesting() {
        let flags = RegFunc1::DEMAND_RESET_CTR;
        // 1 summation, 1 demand, 1 coincident, 1 occurrence, 1 tier
        let layout = RegisterLayout::new(formats(), registers(flags, 1, 1, 1, 1, 1));
        let block = 4 + 3 + 3;
        assert_eq!(DataBlock::size(&layout).unwrap(), block);
        assert_eq!(RegisterData::size(&layout).unwrap(), 1 + 2 * block);

        let mut w = TableWriter::new();
        w.u8(7);
        for tier in 0..2i32 {
            w.i32(1000 + tier).i24(50 + tier).i24(-5 - tier);
        }
        let bytes = w.into_bytes();
        let data = RegisterData::parse(&mut TableReader::new(&bytes), &layout).unwrap();
        assert_eq!(data.nbr_demand_resets, Some(7));
        assert_eq!(data.tot_data_block.summations, Some(vec![1000.0]));
        let tier = &data.tier_data_blocks.as_ref().unwrap()[0];
        assert_eq!(tier.demands.as_ref().unwrap()[0].demands, Some(vec![51.0]));
        assert_eq!(tier.coincidents.as_ref().unwrap()[0].coincident_values, Some(vec![-6.0]));
    }

    #[test]
    fn test_zero_counts_are_absent() {
        let layout = RegisterLayout::new(formats(), registers(RegFunc1::all(), 0, 0, 0, 0, 0));
        let bytes = [9u8, 0, 0, 0, 0, 0];
        let snapshot = RegisterSnapshot::parse(&mut TableReader::new(&bytes), &layout).unwrap();
        assert_eq!(snapshot.season, Some(0));
        let data = snapshot.register_data;
        assert_eq!(data.tot_data_block.summations, None);
        assert_eq!(data.tot_data_block.demands, None);
        assert_eq!(data.tot_data_block.coincidents, None);
        assert_eq!(data.tier_data_blocks, None);
    }
}
