//! `SeaORM` mappings for PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Placement of a currency symbol relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "symbol_position")]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// Symbol rendered before the amount.
    #[sea_orm(string_value = "before")]
    Before,
    /// Symbol rendered after the amount.
    #[sea_orm(string_value = "after")]
    After,
}

impl From<SymbolPosition> for valuta_core::currency::SymbolPosition {
    fn from(value: SymbolPosition) -> Self {
        match value {
            SymbolPosition::Before => Self::Before,
            SymbolPosition::After => Self::After,
        }
    }
}
