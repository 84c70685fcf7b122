//! Rate store repository.
//!
//! Persists directed rate observations and feeds the resolver. Two write
//! disciplines coexist: `upsert_latest` overwrites the newest row per
//! (base, quote) pair - ingestion, self-rates, and cross-rate rebuilds only
//! care about the current value - while `insert_historical` appends, so
//! manual operator entries keep their history.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};

use valuta_core::ingest::FetchedRates;
use valuta_core::rates::{self, Resolved, is_valid_rate, provider};

use crate::entities::{currencies, currency_rates};

use super::price;

/// Error types for rate store operations.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// Rate must be finite and positive.
    #[error("Exchange rate must be a finite, positive number")]
    InvalidRate,

    /// Currency not found by id.
    #[error("Currency {0} not found")]
    CurrencyNotFound(i32),

    /// Currency not found by code, or inactive.
    #[error("Currency '{0}' not found or inactive")]
    UnknownCode(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One observation to write into the store.
#[derive(Debug, Clone)]
pub struct RateWrite {
    /// Base currency id.
    pub base_id: i32,
    /// Quote currency id.
    pub quote_id: i32,
    /// Quote units per one base unit.
    pub rate: f64,
    /// Origin label.
    pub provider: String,
    /// Whether an operator entered the value by hand.
    pub is_manual: bool,
    /// Observation timestamp.
    pub fetched_at: DateTime<Utc>,
}

/// Latest observation for an exact pair: `fetched_at` descending, ties
/// broken by highest id.
pub(crate) async fn latest_for_on<C: ConnectionTrait>(
    conn: &C,
    base_id: i32,
    quote_id: i32,
) -> Result<Option<currency_rates::Model>, DbErr> {
    currency_rates::Entity::find()
        .filter(currency_rates::Column::BaseId.eq(base_id))
        .filter(currency_rates::Column::QuoteId.eq(quote_id))
        .order_by_desc(currency_rates::Column::FetchedAt)
        .order_by_desc(currency_rates::Column::Id)
        .one(conn)
        .await
}

/// Latest observation per distinct quote for a base currency.
pub(crate) async fn latest_for_base_on<C: ConnectionTrait>(
    conn: &C,
    base_id: i32,
) -> Result<BTreeMap<i32, currency_rates::Model>, DbErr> {
    let rows = currency_rates::Entity::find()
        .filter(currency_rates::Column::BaseId.eq(base_id))
        .order_by_desc(currency_rates::Column::FetchedAt)
        .order_by_desc(currency_rates::Column::Id)
        .all(conn)
        .await?;

    let mut latest = BTreeMap::new();
    for row in rows {
        latest.entry(row.quote_id).or_insert(row);
    }
    Ok(latest)
}

/// Overwrites the newest row for the pair, or inserts the first one.
pub(crate) async fn upsert_latest_on<C: ConnectionTrait>(
    conn: &C,
    input: &RateWrite,
) -> Result<currency_rates::Model, RateError> {
    if !is_valid_rate(input.rate) {
        return Err(RateError::InvalidRate);
    }

    match latest_for_on(conn, input.base_id, input.quote_id).await? {
        Some(existing) => {
            let mut active: currency_rates::ActiveModel = existing.into();
            active.rate = Set(input.rate);
            active.provider = Set(input.provider.clone());
            active.is_manual = Set(input.is_manual);
            active.fetched_at = Set(input.fetched_at.into());
            Ok(active.update(conn).await?)
        }
        None => insert_historical_on(conn, input).await,
    }
}

/// Appends a new observation row.
pub(crate) async fn insert_historical_on<C: ConnectionTrait>(
    conn: &C,
    input: &RateWrite,
) -> Result<currency_rates::Model, RateError> {
    if !is_valid_rate(input.rate) {
        return Err(RateError::InvalidRate);
    }

    let row = currency_rates::ActiveModel {
        base_id: Set(input.base_id),
        quote_id: Set(input.quote_id),
        rate: Set(input.rate),
        provider: Set(input.provider.clone()),
        is_manual: Set(input.is_manual),
        fetched_at: Set(input.fetched_at.into()),
        ..Default::default()
    };
    Ok(row.insert(conn).await?)
}

/// Resolves a rate by fetching the candidate pairs and running the pure
/// resolution algorithm over them.
pub(crate) async fn resolve_on<C: ConnectionTrait>(
    conn: &C,
    base_id: i32,
    quote_id: i32,
    default_id: Option<i32>,
) -> Result<Option<Resolved>, DbErr> {
    let mut pairs = vec![(base_id, quote_id), (quote_id, base_id)];
    if let Some(pivot) = default_id {
        if pivot != base_id && pivot != quote_id {
            pairs.extend([
                (base_id, pivot),
                (pivot, base_id),
                (pivot, quote_id),
                (quote_id, pivot),
            ]);
        }
    }

    let mut observations = Vec::new();
    for (base, quote) in pairs {
        if let Some(row) = latest_for_on(conn, base, quote).await? {
            observations.push(row.into_stored());
        }
    }

    Ok(rates::resolve(
        &observations,
        base_id,
        quote_id,
        default_id,
        Utc::now(),
    ))
}

/// Rate store repository.
#[derive(Debug, Clone)]
pub struct RateRepository {
    db: DatabaseConnection,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or overwrites the latest observation for a pair and drops
    /// price-cache entries the pair can influence, in one transaction.
    pub async fn upsert_latest(&self, input: RateWrite) -> Result<currency_rates::Model, RateError> {
        let txn = self.db.begin().await?;
        let row = upsert_latest_on(&txn, &input).await?;
        price::invalidate_for_currency_on(&txn, input.base_id).await?;
        if input.quote_id != input.base_id {
            price::invalidate_for_currency_on(&txn, input.quote_id).await?;
        }
        txn.commit().await?;
        Ok(row)
    }

    /// Appends a historical observation and drops affected price-cache
    /// entries, in one transaction.
    pub async fn insert_historical(
        &self,
        input: RateWrite,
    ) -> Result<currency_rates::Model, RateError> {
        let txn = self.db.begin().await?;
        let row = insert_historical_on(&txn, &input).await?;
        price::invalidate_for_currency_on(&txn, input.base_id).await?;
        if input.quote_id != input.base_id {
            price::invalidate_for_currency_on(&txn, input.quote_id).await?;
        }
        txn.commit().await?;
        Ok(row)
    }

    /// Records a manual operator entry as a new historical row.
    pub async fn record_manual(
        &self,
        base_id: i32,
        quote_id: i32,
        rate: f64,
    ) -> Result<currency_rates::Model, RateError> {
        let row = self
            .insert_historical(RateWrite {
                base_id,
                quote_id,
                rate,
                provider: provider::MANUAL.to_string(),
                is_manual: true,
                fetched_at: Utc::now(),
            })
            .await?;
        info!(base = base_id, quote = quote_id, rate, "manual rate recorded");
        Ok(row)
    }

    /// Returns the latest observation for the exact pair.
    pub async fn latest_for(
        &self,
        base_id: i32,
        quote_id: i32,
    ) -> Result<Option<currency_rates::Model>, RateError> {
        Ok(latest_for_on(&self.db, base_id, quote_id).await?)
    }

    /// Returns the latest observation per distinct quote for a base.
    pub async fn latest_for_base(
        &self,
        base_id: i32,
    ) -> Result<BTreeMap<i32, currency_rates::Model>, RateError> {
        Ok(latest_for_base_on(&self.db, base_id).await?)
    }

    /// Upserts a batch of observations in one transaction. Every entry is
    /// validated before the first write so a bad row cannot leave a partial
    /// batch behind.
    pub async fn bulk_upsert(&self, entries: &[RateWrite]) -> Result<usize, RateError> {
        for entry in entries {
            if !is_valid_rate(entry.rate) {
                return Err(RateError::InvalidRate);
            }
        }

        let txn = self.db.begin().await?;
        let mut touched = BTreeSet::new();
        for entry in entries {
            upsert_latest_on(&txn, entry).await?;
            touched.insert(entry.base_id);
            touched.insert(entry.quote_id);
        }
        for currency_id in touched {
            price::invalidate_for_currency_on(&txn, currency_id).await?;
        }
        txn.commit().await?;

        info!(count = entries.len(), "rate batch upserted");
        Ok(entries.len())
    }

    /// Commits a fetched provider batch: the base self-rate plus one
    /// observation per resolved quote, all sharing the batch timestamp and
    /// provider label. Codes the registry does not know (or has
    /// deactivated) are skipped with a warning; everything else commits
    /// atomically.
    pub async fn apply_fetched(&self, fetched: &FetchedRates) -> Result<usize, RateError> {
        let base = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(&fetched.base))
            .filter(currencies::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| RateError::UnknownCode(fetched.base.clone()))?;

        let txn = self.db.begin().await?;

        upsert_latest_on(
            &txn,
            &RateWrite {
                base_id: base.id,
                quote_id: base.id,
                rate: 1.0,
                provider: fetched.provider.clone(),
                is_manual: false,
                fetched_at: fetched.fetched_at,
            },
        )
        .await?;

        let mut touched = BTreeSet::from([base.id]);
        let mut written = 0;
        for (code, rate) in &fetched.rates {
            let Some(quote) = currencies::Entity::find()
                .filter(currencies::Column::Code.eq(code))
                .filter(currencies::Column::IsActive.eq(true))
                .one(&txn)
                .await?
            else {
                warn!(code = %code, "ingested rate for a currency the registry does not carry");
                continue;
            };

            upsert_latest_on(
                &txn,
                &RateWrite {
                    base_id: base.id,
                    quote_id: quote.id,
                    rate: *rate,
                    provider: fetched.provider.clone(),
                    is_manual: false,
                    fetched_at: fetched.fetched_at,
                },
            )
            .await?;
            touched.insert(quote.id);
            written += 1;
        }

        for currency_id in touched {
            price::invalidate_for_currency_on(&txn, currency_id).await?;
        }
        txn.commit().await?;

        info!(
            base = %fetched.base,
            provider = %fetched.provider,
            count = written,
            "provider rates ingested"
        );
        Ok(written)
    }

    /// Resolves the rate from `base_id` to `quote_id`, chaining through
    /// `default_id` when direct and inverse lookups fail. Absence of a path
    /// returns `Ok(None)`.
    pub async fn resolve(
        &self,
        base_id: i32,
        quote_id: i32,
        default_id: Option<i32>,
    ) -> Result<Option<Resolved>, RateError> {
        Ok(resolve_on(&self.db, base_id, quote_id, default_id).await?)
    }
}
