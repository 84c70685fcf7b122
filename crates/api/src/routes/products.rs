//! Product pricing routes.
//!
//! The catalog proper is maintained by the surrounding store; these routes
//! cover the data operations it needs for price fields, plus the one read
//! the storefront cares about: a product's price in a given currency.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError};
use valuta_db::repositories::{
    CreateProductInput, PriceRepository, ProductRepository, UpdatePricingInput,
};

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route(
            "/products/{id}/price",
            get(product_price).patch(update_pricing),
        )
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Product title.
    pub title: String,
    /// Base price in the product's own currency.
    pub price: f64,
    /// Optional old ("was") price.
    pub old_price: Option<f64>,
    /// Currency the price is quoted in.
    pub currency_code: String,
}

/// POST `/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    let created = repo
        .create(CreateProductInput {
            title: payload.title,
            price: payload.price,
            old_price: payload.old_price,
            currency_code: payload.currency_code,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": created.id,
            "title": created.title,
            "price": created.price,
            "old_price": created.old_price,
            "currency_code": created.currency_code,
        })),
    ))
}

/// Query parameters for a price read.
#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    /// Target currency code.
    pub currency: String,
}

/// GET `/products/{id}/price?currency=EUR` - The product's price in the
/// target currency, cached or freshly resolved.
async fn product_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PriceRepository::new((*state.db).clone());
    let quote = repo.price_for(id, &query.currency).await?;
    Ok((StatusCode::OK, Json(quote)))
}

/// Request body for price-field changes.
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePricingRequest {
    /// New base price.
    pub price: Option<f64>,
    /// New old price.
    pub old_price: Option<f64>,
    /// Set to clear the old price entirely.
    #[serde(default)]
    pub clear_old_price: bool,
    /// New currency code.
    pub currency_code: Option<String>,
}

/// PATCH `/products/{id}/price` - Change price fields; the product's cached
/// prices are dropped in the same transaction.
async fn update_pricing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePricingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    let old_price = if payload.clear_old_price {
        Some(None)
    } else {
        payload.old_price.map(Some)
    };
    let updated = repo
        .update_pricing(
            id,
            UpdatePricingInput {
                price: payload.price,
                old_price,
                currency_code: payload.currency_code,
            },
        )
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "id": updated.id,
            "price": updated.price,
            "old_price": updated.old_price,
            "currency_code": updated.currency_code,
        })),
    ))
}
