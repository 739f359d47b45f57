//! ST23 Current Register Data, ST24 Previous Season Data and ST25 Previous
//! Demand Reset Data. All three are sized entirely by ST0 formats and ST21
//! counts through the register records.

use crate::codec::TableReader;
use crate::constants::*;
use crate::error::{DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::tables::records::{Record, RegisterData, RegisterLayout, RegisterSnapshot};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRegisterData {
    pub data: RegisterData,
}

impl TableDefinition for CurrentRegisterData {
    type Deps = RegisterLayout;
    const KEY: TableKey = TableKey::standard(ST_CURRENT_REGISTER_DATA);
    const NAME: &'static str = "Current Register Data";

    fn dependencies(session: &TableSession) -> TableResult<RegisterLayout> {
        RegisterLayout::resolve(session)
    }

    fn decode(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        Ok(Self {
            data: RegisterData::parse(r, layout)?,
        })
    }
}

/// Registers frozen at the last season change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousSeasonData {
    pub snapshot: RegisterSnapshot,
}

impl TableDefinition for PreviousSeasonData {
    type Deps = RegisterLayout;
    const KEY: TableKey = TableKey::standard(ST_PREVIOUS_SEASON_DATA);
    const NAME: &'static str = "Previous Season Data";

    fn dependencies(session: &TableSession) -> TableResult<RegisterLayout> {
        RegisterLayout::resolve(session)
    }

    fn decode(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        Ok(Self {
            snapshot: RegisterSnapshot::parse(r, layout)?,
        })
    }
}

/// Registers frozen at the last demand reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousDemandResetData {
    pub snapshot: RegisterSnapshot,
}

impl TableDefinition for PreviousDemandResetData {
    type Deps = RegisterLayout;
    const KEY: TableKey = TableKey::standard(ST_PREVIOUS_DEMAND_RESET_DATA);
    const NAME: &'static str = "Previous Demand Reset Data";

    fn dependencies(session: &TableSession) -> TableResult<RegisterLayout> {
        RegisterLayout::resolve(session)
    }

    fn decode(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        Ok(Self {
            snapshot: RegisterSnapshot::parse(r, layout)?,
        })
    }
}
