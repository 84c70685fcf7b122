//! Currency registry repository.
//!
//! Owns the set of known currencies and the single default (pivot)
//! currency. Promotion to default is the one operation with real teeth: the
//! flag flip, the cross-rate rebuild from the old default, and the new
//! self-rate all commit in a single transaction or not at all.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use valuta_core::rates::{cross_rates, provider};
use valuta_shared::CurrencyCode;

use crate::entities::{currencies, sea_orm_active_enums::SymbolPosition};

use super::price;
use super::rate::{self, RateError, RateWrite};

/// Error types for currency registry operations.
#[derive(Debug, thiserror::Error)]
pub enum CurrencyError {
    /// Currency not found by id.
    #[error("Currency {0} not found")]
    NotFound(i32),

    /// Currency not found by code.
    #[error("Currency '{0}' not found")]
    CodeNotFound(String),

    /// No currency is flagged as default.
    #[error("No default currency is configured")]
    NoDefault,

    /// Malformed currency code.
    #[error("Invalid currency code '{0}': expected three uppercase letters")]
    InvalidCode(String),

    /// Decimal precision out of range.
    #[error("Decimal places must be between 0 and 4")]
    InvalidPrecision,

    /// Duplicate code.
    #[error("Currency '{0}' already exists")]
    AlreadyExists(String),

    /// The default currency cannot be removed.
    #[error("The default currency cannot be deleted")]
    DeleteDefault,

    /// The switch cannot produce consistent cross-rates.
    #[error("Cannot rebuild cross-rates: {0}")]
    Rebuild(String),

    /// Rate store error.
    #[error("Rate store error: {0}")]
    Rate(#[from] RateError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a currency.
#[derive(Debug, Clone)]
pub struct CreateCurrencyInput {
    /// Three-letter code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Display symbol.
    pub symbol: String,
    /// Decimal precision (0..=4).
    pub decimal_places: i16,
    /// Symbol placement.
    pub symbol_position: SymbolPosition,
    /// Thousands separator.
    pub thousands_separator: String,
    /// Decimal separator.
    pub decimal_separator: String,
    /// Manual sort order.
    pub sort_order: i32,
    /// Active flag.
    pub is_active: bool,
}

/// Input for updating a currency; `None` fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateCurrencyInput {
    /// Display name.
    pub name: Option<String>,
    /// Display symbol.
    pub symbol: Option<String>,
    /// Decimal precision (0..=4).
    pub decimal_places: Option<i16>,
    /// Symbol placement.
    pub symbol_position: Option<SymbolPosition>,
    /// Thousands separator.
    pub thousands_separator: Option<String>,
    /// Decimal separator.
    pub decimal_separator: Option<String>,
    /// Manual sort order.
    pub sort_order: Option<i32>,
    /// Active flag.
    pub is_active: Option<bool>,
}

/// Currency registry repository.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    db: DatabaseConnection,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all currencies in manual sort order, then by code.
    pub async fn list(&self) -> Result<Vec<currencies::Model>, CurrencyError> {
        Ok(currencies::Entity::find()
            .order_by_asc(currencies::Column::SortOrder)
            .order_by_asc(currencies::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Fetches a currency by id.
    pub async fn get(&self, id: i32) -> Result<currencies::Model, CurrencyError> {
        currencies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CurrencyError::NotFound(id))
    }

    /// Fetches a currency by its three-letter code.
    pub async fn get_by_code(&self, code: &str) -> Result<currencies::Model, CurrencyError> {
        let code = CurrencyCode::parse(code)
            .map_err(|_| CurrencyError::InvalidCode(code.to_string()))?;
        currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?
            .ok_or_else(|| CurrencyError::CodeNotFound(code.to_string()))
    }

    /// Fetches the default (pivot) currency.
    ///
    /// Absence of a default is a configuration state the caller must
    /// tolerate; the resolver treats it as "pivot chaining unavailable".
    pub async fn get_default(&self) -> Result<currencies::Model, CurrencyError> {
        currencies::Entity::find()
            .filter(currencies::Column::IsDefault.eq(true))
            .one(&self.db)
            .await?
            .ok_or(CurrencyError::NoDefault)
    }

    /// Creates a currency.
    pub async fn create(
        &self,
        input: CreateCurrencyInput,
    ) -> Result<currencies::Model, CurrencyError> {
        let code = CurrencyCode::parse(&input.code)
            .map_err(|_| CurrencyError::InvalidCode(input.code.clone()))?;
        if !(0..=4).contains(&input.decimal_places) {
            return Err(CurrencyError::InvalidPrecision);
        }

        let existing = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CurrencyError::AlreadyExists(code.to_string()));
        }

        let now = Utc::now();
        let row = currencies::ActiveModel {
            code: Set(code.to_string()),
            name: Set(input.name),
            symbol: Set(input.symbol),
            decimal_places: Set(input.decimal_places),
            symbol_position: Set(input.symbol_position),
            thousands_separator: Set(input.thousands_separator),
            decimal_separator: Set(input.decimal_separator),
            sort_order: Set(input.sort_order),
            is_active: Set(input.is_active),
            is_default: Set(false),
            promoted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let created = row.insert(&self.db).await?;
        info!(code = %created.code, id = created.id, "currency created");
        Ok(created)
    }

    /// Updates a currency's metadata.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateCurrencyInput,
    ) -> Result<currencies::Model, CurrencyError> {
        if let Some(places) = input.decimal_places {
            if !(0..=4).contains(&places) {
                return Err(CurrencyError::InvalidPrecision);
            }
        }

        let existing = self.get(id).await?;
        let mut active: currencies::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(symbol) = input.symbol {
            active.symbol = Set(symbol);
        }
        if let Some(places) = input.decimal_places {
            active.decimal_places = Set(places);
        }
        if let Some(position) = input.symbol_position {
            active.symbol_position = Set(position);
        }
        if let Some(sep) = input.thousands_separator {
            active.thousands_separator = Set(sep);
        }
        if let Some(sep) = input.decimal_separator {
            active.decimal_separator = Set(sep);
        }
        if let Some(order) = input.sort_order {
            active.sort_order = Set(order);
        }
        if let Some(flag) = input.is_active {
            active.is_active = Set(flag);
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a currency. The default currency is protected; deactivate or
    /// promote another currency first.
    pub async fn delete(&self, id: i32) -> Result<(), CurrencyError> {
        let existing = self.get(id).await?;
        if existing.is_default {
            return Err(CurrencyError::DeleteDefault);
        }
        currencies::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(code = %existing.code, id, "currency deleted");
        Ok(())
    }

    /// Promotes a currency to default and rebuilds cross-rates from the old
    /// default, all in one transaction.
    ///
    /// When an old default exists (and differs from the target), every
    /// quote it had a rate for gets an equivalent rate relative to the new
    /// default, derived from the old default's rate to it. A missing or
    /// unusable old-to-new rate aborts the whole switch. The price cache is
    /// dropped wholesale - the rebuild rewrites rates across the board.
    pub async fn set_default(&self, id: i32) -> Result<currencies::Model, CurrencyError> {
        let txn = self.db.begin().await?;

        let target = currencies::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CurrencyError::NotFound(id))?;
        let old = currencies::Entity::find()
            .filter(currencies::Column::IsDefault.eq(true))
            .one(&txn)
            .await?;
        let now = Utc::now();

        if let Some(old) = &old {
            if old.id != target.id {
                let mut cleared: currencies::ActiveModel = old.clone().into();
                cleared.is_default = Set(false);
                cleared.updated_at = Set(now.into());
                cleared.update(&txn).await?;
            }
        }

        let mut promoted: currencies::ActiveModel = target.clone().into();
        promoted.is_default = Set(true);
        promoted.promoted_at = Set(Some(now.into()));
        promoted.updated_at = Set(now.into());
        let promoted = promoted.update(&txn).await?;

        let mut rebuilt = 0;
        if let Some(old) = &old {
            if old.id != target.id {
                let latest = rate::latest_for_base_on(&txn, old.id).await?;
                let old_rates: BTreeMap<i32, f64> =
                    latest.iter().map(|(quote, row)| (*quote, row.rate)).collect();
                let crosses = cross_rates(&old_rates, target.id)
                    .map_err(|err| CurrencyError::Rebuild(err.to_string()))?;

                for cross in &crosses {
                    rate::upsert_latest_on(
                        &txn,
                        &RateWrite {
                            base_id: target.id,
                            quote_id: cross.quote_id,
                            rate: cross.rate,
                            provider: provider::CROSS.to_string(),
                            is_manual: false,
                            fetched_at: now,
                        },
                    )
                    .await?;
                }
                rebuilt = crosses.len();
            }
        }

        // The new default always carries its own self-rate
        rate::upsert_latest_on(
            &txn,
            &RateWrite {
                base_id: target.id,
                quote_id: target.id,
                rate: 1.0,
                provider: provider::SYSTEM.to_string(),
                is_manual: false,
                fetched_at: now,
            },
        )
        .await?;

        price::clear_all_on(&txn).await?;
        txn.commit().await?;

        info!(
            new_default = %promoted.code,
            old_default = old.as_ref().map(|c| c.code.clone()).unwrap_or_default(),
            rebuilt,
            "default currency switched"
        );
        Ok(promoted)
    }
}
