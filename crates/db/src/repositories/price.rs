//! Price cache repository.
//!
//! Stores the last computed price of a product per currency so reads do not
//! resolve rates every time. The cache is a projection: entries are created
//! lazily on the first miss, overwritten idempotently (last write wins),
//! and dropped eagerly whenever the underlying product price or an
//! applicable rate changes.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use tracing::debug;

use valuta_core::currency::{convert_price, format_amount};

use crate::entities::{currencies, product_prices, products};

use super::rate::{self, RateError};

/// Error types for price cache operations.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    /// Product not found.
    #[error("Product {0} not found")]
    ProductNotFound(i32),

    /// Target currency unknown or inactive.
    #[error("Currency '{0}' not found or inactive")]
    CurrencyNotFound(String),

    /// No rate path exists between the two currencies.
    #[error("No rate available from '{0}' to '{1}'")]
    NoRate(String, String),

    /// Rate store error.
    #[error("Rate store error: {0}")]
    Rate(#[from] RateError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Where a returned price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Returned straight from the cache.
    Cache,
    /// Freshly computed from a resolved rate.
    Rate,
}

/// A product price in a concrete currency.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    /// Product id.
    pub product_id: i32,
    /// Currency the price is expressed in.
    pub currency: String,
    /// Price, rounded to the currency's precision.
    pub price: f64,
    /// Old ("was") price, when the product has one.
    pub old_price: Option<f64>,
    /// Price formatted with the currency's display metadata.
    pub formatted: String,
    /// Cache hit or fresh computation.
    pub source: PriceSource,
    /// When the value was computed.
    pub computed_at: DateTime<Utc>,
}

/// Drops cache entries a rewritten rate for `currency_id` can influence:
/// entries priced in that currency, and entries of products based in it.
pub(crate) async fn invalidate_for_currency_on<C: ConnectionTrait>(
    conn: &C,
    currency_id: i32,
) -> Result<u64, DbErr> {
    let mut dropped = product_prices::Entity::delete_many()
        .filter(product_prices::Column::CurrencyId.eq(currency_id))
        .exec(conn)
        .await?
        .rows_affected;

    if let Some(currency) = currencies::Entity::find_by_id(currency_id).one(conn).await? {
        let product_ids: Vec<i32> = products::Entity::find()
            .filter(products::Column::CurrencyCode.eq(&currency.code))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if !product_ids.is_empty() {
            dropped += product_prices::Entity::delete_many()
                .filter(product_prices::Column::ProductId.is_in(product_ids))
                .exec(conn)
                .await?
                .rows_affected;
        }
    }

    if dropped > 0 {
        debug!(currency_id, dropped, "price cache entries invalidated");
    }
    Ok(dropped)
}

/// Drops every cache entry for one product.
pub(crate) async fn invalidate_product_on<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<u64, DbErr> {
    Ok(product_prices::Entity::delete_many()
        .filter(product_prices::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?
        .rows_affected)
}

/// Drops the entire cache.
pub(crate) async fn clear_all_on<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    Ok(product_prices::Entity::delete_many()
        .exec(conn)
        .await?
        .rows_affected)
}

/// Price cache repository.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    db: DatabaseConnection,
}

impl PriceRepository {
    /// Creates a new price repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the product's price in the target currency, from the cache
    /// when possible, otherwise computed through the resolver and cached.
    ///
    /// The product's own currency is its stored code; when the registry
    /// does not know that code, the registry default stands in. No rate
    /// path between the two currencies is a reportable failure - a wrong
    /// price is worse than no price.
    pub async fn price_for(
        &self,
        product_id: i32,
        target_code: &str,
    ) -> Result<PriceQuote, PriceError> {
        let product = products::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(PriceError::ProductNotFound(product_id))?;

        let target = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(target_code))
            .filter(currencies::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| PriceError::CurrencyNotFound(target_code.to_string()))?;

        if let Some(hit) = product_prices::Entity::find_by_id((product.id, target.id))
            .one(&self.db)
            .await?
        {
            return Ok(PriceQuote {
                product_id: product.id,
                currency: target.code.clone(),
                price: hit.price,
                old_price: hit.old_price,
                formatted: format_amount(hit.price, &target.style()),
                source: PriceSource::Cache,
                computed_at: hit.computed_at.into(),
            });
        }

        let default = self.default_currency().await?;
        let own = match currencies::Entity::find()
            .filter(currencies::Column::Code.eq(&product.currency_code))
            .one(&self.db)
            .await?
        {
            Some(currency) => currency,
            None => default
                .clone()
                .ok_or_else(|| PriceError::CurrencyNotFound(product.currency_code.clone()))?,
        };

        let resolved = rate::resolve_on(&self.db, own.id, target.id, default.map(|c| c.id))
            .await?
            .ok_or_else(|| PriceError::NoRate(own.code.clone(), target.code.clone()))?;

        #[allow(clippy::cast_sign_loss)]
        let places = target.decimal_places.max(0) as u32;
        let price = convert_price(product.price, resolved.rate(), places);
        let old_price = product
            .old_price
            .map(|value| convert_price(value, resolved.rate(), places));
        let now = Utc::now();

        let entry = product_prices::ActiveModel {
            product_id: Set(product.id),
            currency_id: Set(target.id),
            price: Set(price),
            old_price: Set(old_price),
            rate_id: Set(resolved.stored_id()),
            computed_at: Set(now.into()),
        };
        product_prices::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    product_prices::Column::ProductId,
                    product_prices::Column::CurrencyId,
                ])
                .update_columns([
                    product_prices::Column::Price,
                    product_prices::Column::OldPrice,
                    product_prices::Column::RateId,
                    product_prices::Column::ComputedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        debug!(
            product_id = product.id,
            currency = %target.code,
            rate = resolved.rate(),
            provider = %resolved.provider_label(),
            "price computed and cached"
        );

        Ok(PriceQuote {
            product_id: product.id,
            currency: target.code.clone(),
            price,
            old_price,
            formatted: format_amount(price, &target.style()),
            source: PriceSource::Rate,
            computed_at: now,
        })
    }

    /// Drops every cache entry for one product.
    pub async fn invalidate_product(&self, product_id: i32) -> Result<u64, PriceError> {
        Ok(invalidate_product_on(&self.db, product_id).await?)
    }

    async fn default_currency(&self) -> Result<Option<currencies::Model>, DbErr> {
        currencies::Entity::find()
            .filter(currencies::Column::IsDefault.eq(true))
            .one(&self.db)
            .await
    }
}
