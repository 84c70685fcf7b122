//! Rate management routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{AppState, error::ApiError};
use valuta_core::rates::provider;
use valuta_db::repositories::{CurrencyError, CurrencyRepository, RateRepository, RateWrite};
use valuta_shared::AppError;

/// Creates the rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(resolve_rate).post(record_rate))
        .route("/rates/bulk", post(bulk_upsert))
        .route("/rates/refresh", post(refresh_rates))
}

/// Resolves the default currency id, tolerating its absence.
async fn default_id(repo: &CurrencyRepository) -> Result<Option<i32>, ApiError> {
    match repo.get_default().await {
        Ok(currency) => Ok(Some(currency.id)),
        Err(CurrencyError::NoDefault) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Query parameters for resolving a rate.
#[derive(Debug, Deserialize)]
pub struct ResolveRateQuery {
    /// Base currency code.
    pub from: String,
    /// Quote currency code.
    pub to: String,
}

/// Response for a resolved rate.
#[derive(Debug, Serialize)]
pub struct ResolveRateResponse {
    /// Base currency code.
    pub from: String,
    /// Quote currency code.
    pub to: String,
    /// Quote units per one base unit.
    pub rate: f64,
    /// Origin: a provider label, `synthetic`, `inverse:<id>`, or `via-default`.
    pub provider: String,
    /// Whether the value traces back to a manual entry.
    pub is_manual: bool,
    /// Id of the stored observation, absent for derived values.
    pub stored_id: Option<i32>,
    /// Observation or computation timestamp.
    pub fetched_at: DateTime<Utc>,
}

/// GET `/rates?from=USD&to=EUR` - Resolve a rate between two currencies.
async fn resolve_rate(
    State(state): State<AppState>,
    Query(query): Query<ResolveRateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let currency_repo = CurrencyRepository::new((*state.db).clone());
    let rate_repo = RateRepository::new((*state.db).clone());

    let from = currency_repo.get_by_code(&query.from).await?;
    let to = currency_repo.get_by_code(&query.to).await?;
    let pivot = default_id(&currency_repo).await?;

    let resolved = rate_repo
        .resolve(from.id, to.id, pivot)
        .await?
        .ok_or_else(|| AppError::NoRate(format!("'{}' -> '{}'", from.code, to.code)))?;

    Ok((
        StatusCode::OK,
        Json(ResolveRateResponse {
            from: from.code,
            to: to.code,
            rate: resolved.rate(),
            provider: resolved.provider_label(),
            is_manual: resolved.is_manual(),
            stored_id: resolved.stored_id(),
            fetched_at: resolved.fetched_at(),
        }),
    ))
}

/// Request body for recording a manual rate.
#[derive(Debug, Deserialize)]
pub struct RecordRateRequest {
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Quote units per one base unit.
    pub rate: f64,
}

/// POST `/rates` - Record a manual rate observation.
async fn record_rate(
    State(state): State<AppState>,
    Json(payload): Json<RecordRateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency_repo = CurrencyRepository::new((*state.db).clone());
    let rate_repo = RateRepository::new((*state.db).clone());

    let base = currency_repo.get_by_code(&payload.base).await?;
    let quote = currency_repo.get_by_code(&payload.quote).await?;
    if base.id == quote.id {
        return Err(AppError::Validation(
            "Base and quote currencies must differ; self-rates are system-managed".to_string(),
        )
        .into());
    }

    let row = rate_repo.record_manual(base.id, quote.id, payload.rate).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": row.id,
            "base": base.code,
            "quote": quote.code,
            "rate": row.rate,
            "provider": row.provider,
            "fetched_at": row.fetched_at,
        })),
    ))
}

/// One entry of a bulk rate upsert.
#[derive(Debug, Deserialize)]
pub struct BulkRateEntry {
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Quote units per one base unit.
    pub rate: f64,
    /// Origin label; defaults to `manual`.
    pub provider: Option<String>,
}

/// Request body for a bulk upsert.
#[derive(Debug, Deserialize)]
pub struct BulkUpsertRequest {
    /// Entries to upsert in one transaction.
    pub rates: Vec<BulkRateEntry>,
}

/// POST `/rates/bulk` - Upsert a batch of rates in one transaction.
async fn bulk_upsert(
    State(state): State<AppState>,
    Json(payload): Json<BulkUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency_repo = CurrencyRepository::new((*state.db).clone());
    let rate_repo = RateRepository::new((*state.db).clone());

    let now = Utc::now();
    let mut writes = Vec::with_capacity(payload.rates.len());
    for entry in &payload.rates {
        let base = currency_repo.get_by_code(&entry.base).await?;
        let quote = currency_repo.get_by_code(&entry.quote).await?;
        if base.id == quote.id {
            return Err(AppError::Validation(format!(
                "Base and quote currencies must differ (got '{}' twice)",
                base.code
            ))
            .into());
        }
        let label = entry
            .provider
            .clone()
            .unwrap_or_else(|| provider::MANUAL.to_string());
        writes.push(RateWrite {
            base_id: base.id,
            quote_id: quote.id,
            rate: entry.rate,
            is_manual: label == provider::MANUAL,
            provider: label,
            fetched_at: now,
        });
    }

    let count = rate_repo.bulk_upsert(&writes).await?;
    Ok((StatusCode::OK, Json(json!({ "upserted": count }))))
}

/// Request body for triggering ingestion.
#[derive(Debug, Deserialize)]
pub struct RefreshRatesRequest {
    /// Base currency code the fetched rates are relative to.
    pub base: String,
}

/// POST `/rates/refresh` - Fetch provider rates for a base currency against
/// every active currency and commit them as one batch.
async fn refresh_rates(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRatesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency_repo = CurrencyRepository::new((*state.db).clone());
    let rate_repo = RateRepository::new((*state.db).clone());

    let base = currency_repo.get_by_code(&payload.base).await?;
    let quote_codes: Vec<String> = currency_repo
        .list()
        .await?
        .into_iter()
        .filter(|c| c.is_active && c.id != base.id)
        .map(|c| c.code)
        .collect();

    let fetched = state.provider.fetch(&base.code, &quote_codes).await?;
    let ingested = rate_repo.apply_fetched(&fetched).await?;

    info!(base = %base.code, ingested, "rate refresh completed");
    Ok((
        StatusCode::OK,
        Json(json!({
            "base": base.code,
            "ingested": ingested,
            "fetched_at": fetched.fetched_at,
        })),
    ))
}
