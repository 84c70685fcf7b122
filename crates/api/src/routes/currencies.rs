//! Currency registry routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::ApiError};
use valuta_db::entities::{currencies, sea_orm_active_enums::SymbolPosition};
use valuta_db::repositories::{
    CreateCurrencyInput, CurrencyRepository, RateRepository, UpdateCurrencyInput,
};

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies).post(create_currency))
        .route(
            "/currencies/{id}",
            axum::routing::patch(update_currency).delete(delete_currency),
        )
        .route("/currencies/{id}/default", post(promote_default))
        .route("/currencies/{id}/rates", get(list_rates))
}

/// Response for a currency.
#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    /// Numeric id.
    pub id: i32,
    /// Currency code (ISO 4217 style).
    pub code: String,
    /// Currency name.
    pub name: String,
    /// Currency symbol.
    pub symbol: String,
    /// Number of decimal places.
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
    /// Whether this is the default (pivot) currency.
    pub is_default: bool,
    /// Last promotion to default.
    pub promoted_at: Option<DateTime<Utc>>,
}

impl From<currencies::Model> for CurrencyResponse {
    fn from(model: currencies::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            symbol: model.symbol,
            decimal_places: model.decimal_places,
            symbol_position: model.symbol_position,
            thousands_separator: model.thousands_separator,
            decimal_separator: model.decimal_separator,
            sort_order: model.sort_order,
            is_active: model.is_active,
            is_default: model.is_default,
            promoted_at: model.promoted_at.map(Into::into),
        }
    }
}

/// Request body for creating a currency.
#[derive(Debug, Deserialize)]
pub struct CreateCurrencyRequest {
    /// Three-letter code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Display symbol.
    pub symbol: String,
    /// Decimal precision.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: i16,
    /// Symbol placement: "before" or "after".
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
    /// Thousands separator.
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: String,
    /// Decimal separator.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
    /// Manual sort order.
    #[serde(default)]
    pub sort_order: i32,
    /// Active flag.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_decimal_places() -> i16 {
    2
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

fn default_thousands_separator() -> String {
    ",".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

/// Request body for updating a currency.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateCurrencyRequest {
    /// Display name.
    pub name: Option<String>,
    /// Display symbol.
    pub symbol: Option<String>,
    /// Decimal precision.
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

/// GET `/currencies` - List all currencies in sort order.
async fn list_currencies(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let currencies: Vec<CurrencyResponse> =
        repo.list().await?.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(json!({ "currencies": currencies }))))
}

/// POST `/currencies` - Create a currency.
async fn create_currency(
    State(state): State<AppState>,
    Json(payload): Json<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let created = repo
        .create(CreateCurrencyInput {
            code: payload.code,
            name: payload.name,
            symbol: payload.symbol,
            decimal_places: payload.decimal_places,
            symbol_position: payload.symbol_position,
            thousands_separator: payload.thousands_separator,
            decimal_separator: payload.decimal_separator,
            sort_order: payload.sort_order,
            is_active: payload.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CurrencyResponse::from(created))))
}

/// PATCH `/currencies/{id}` - Update a currency's metadata.
async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let updated = repo
        .update(
            id,
            UpdateCurrencyInput {
                name: payload.name,
                symbol: payload.symbol,
                decimal_places: payload.decimal_places,
                symbol_position: payload.symbol_position,
                thousands_separator: payload.thousands_separator,
                decimal_separator: payload.decimal_separator,
                sort_order: payload.sort_order,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(CurrencyResponse::from(updated))))
}

/// DELETE `/currencies/{id}` - Delete a currency.
async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/currencies/{id}/default` - Promote a currency to default.
///
/// Rebuilds cross-rates from the previous default inside the same
/// transaction; a missing old-to-new rate aborts the whole switch.
async fn promote_default(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let promoted = repo.set_default(id).await?;
    Ok((StatusCode::OK, Json(CurrencyResponse::from(promoted))))
}

/// One row in a currency's latest-rates listing.
#[derive(Debug, Serialize)]
pub struct RateRow {
    /// Quote currency code.
    pub quote: String,
    /// Quote units per one base unit.
    pub rate: f64,
    /// Origin label.
    pub provider: String,
    /// Manual entry flag.
    pub is_manual: bool,
    /// Observation timestamp.
    pub fetched_at: DateTime<Utc>,
}

/// GET `/currencies/{id}/rates` - Latest rate per quote currency.
async fn list_rates(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let currency_repo = CurrencyRepository::new((*state.db).clone());
    let rate_repo = RateRepository::new((*state.db).clone());

    let base = currency_repo.get(id).await?;
    let by_code: std::collections::HashMap<i32, String> = currency_repo
        .list()
        .await?
        .into_iter()
        .map(|c| (c.id, c.code))
        .collect();

    let rows: Vec<RateRow> = rate_repo
        .latest_for_base(id)
        .await?
        .into_values()
        .filter_map(|row| {
            by_code.get(&row.quote_id).map(|code| RateRow {
                quote: code.clone(),
                rate: row.rate,
                provider: row.provider,
                is_manual: row.is_manual,
                fetched_at: row.fetched_at.into(),
            })
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(json!({ "base": base.code, "rates": rows })),
    ))
}
