//! `SeaORM` Entity for the currency_rates table.
//!
//! Each row is one directed observation: `rate` quote units per one base
//! unit. The pair (base, quote) can appear many times over time; the latest
//! `fetched_at` (ties broken by id) is the current rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currency_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub base_id: i32,
    pub quote_id: i32,
    pub rate: f64,
    pub provider: String,
    pub is_manual: bool,
    pub fetched_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::BaseId",
        to = "super::currencies::Column::Id"
    )]
    BaseCurrency,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::QuoteId",
        to = "super::currencies::Column::Id"
    )]
    QuoteCurrency,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the core observation type.
    #[must_use]
    pub fn into_stored(self) -> valuta_core::rates::StoredRate {
        valuta_core::rates::StoredRate {
            id: self.id,
            base_id: self.base_id,
            quote_id: self.quote_id,
            rate: self.rate,
            provider: self.provider,
            is_manual: self.is_manual,
            fetched_at: self.fetched_at.into(),
        }
    }
}
