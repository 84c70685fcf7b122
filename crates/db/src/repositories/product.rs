//! Product repository.
//!
//! Only the pricing surface of products lives in this subsystem; the rest
//! of the catalog is maintained elsewhere. Every change to price fields
//! drops the product's cache entries in the same transaction - the cache
//! must never serve a pre-change value.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

use valuta_shared::CurrencyCode;

use crate::entities::{currencies, products};

use super::price;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Product not found.
    #[error("Product {0} not found")]
    NotFound(i32),

    /// Price values must be finite and non-negative.
    #[error("Price must be a finite, non-negative number")]
    InvalidPrice,

    /// The product's currency code is unknown to the registry.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product title.
    pub title: String,
    /// Base price in the product's own currency.
    pub price: f64,
    /// Optional old ("was") price.
    pub old_price: Option<f64>,
    /// Currency the price is quoted in.
    pub currency_code: String,
}

/// Price-field changes; `None` fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePricingInput {
    /// New base price.
    pub price: Option<f64>,
    /// New old price (`Some(None)` clears it).
    pub old_price: Option<Option<f64>>,
    /// New currency code.
    pub currency_code: Option<String>,
}

fn valid_price(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a product by id.
    pub async fn get(&self, id: i32) -> Result<products::Model, ProductError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Creates a product priced in an existing currency.
    pub async fn create(&self, input: CreateProductInput) -> Result<products::Model, ProductError> {
        if !valid_price(input.price) || !input.old_price.is_none_or(valid_price) {
            return Err(ProductError::InvalidPrice);
        }
        let code = self.known_code(&input.currency_code).await?;

        let now = Utc::now();
        let row = products::ActiveModel {
            title: Set(input.title),
            price: Set(input.price),
            old_price: Set(input.old_price),
            currency_code: Set(code),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let created = row.insert(&self.db).await?;
        info!(id = created.id, title = %created.title, "product created");
        Ok(created)
    }

    /// Applies price-field changes and drops the product's cache entries in
    /// one transaction.
    pub async fn update_pricing(
        &self,
        id: i32,
        input: UpdatePricingInput,
    ) -> Result<products::Model, ProductError> {
        if !input.price.is_none_or(valid_price)
            || !input.old_price.flatten().is_none_or(valid_price)
        {
            return Err(ProductError::InvalidPrice);
        }
        let currency_code = match &input.currency_code {
            Some(code) => Some(self.known_code(code).await?),
            None => None,
        };

        let txn = self.db.begin().await?;
        let existing = products::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let mut active: products::ActiveModel = existing.into();
        if let Some(value) = input.price {
            active.price = Set(value);
        }
        if let Some(value) = input.old_price {
            active.old_price = Set(value);
        }
        if let Some(code) = currency_code {
            active.currency_code = Set(code);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        price::invalidate_product_on(&txn, id).await?;
        txn.commit().await?;

        info!(id, price = updated.price, "product pricing updated");
        Ok(updated)
    }

    async fn known_code(&self, code: &str) -> Result<String, ProductError> {
        let code = CurrencyCode::parse(code)
            .map_err(|_| ProductError::CurrencyNotFound(code.to_string()))?;
        currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?
            .ok_or_else(|| ProductError::CurrencyNotFound(code.to_string()))?;
        Ok(code.to_string())
    }
}
