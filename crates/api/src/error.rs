//! Error to HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use valuta_core::ingest::ProviderError;
use valuta_db::repositories::{CurrencyError, PriceError, ProductError, RateError};
use valuta_shared::AppError;

/// Wrapper turning `AppError` into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self(match err {
            RateError::InvalidRate => AppError::Validation(err.to_string()),
            RateError::CurrencyNotFound(_) | RateError::UnknownCode(_) => {
                AppError::Validation(err.to_string())
            }
            RateError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        Self(match err {
            CurrencyError::NotFound(_)
            | CurrencyError::CodeNotFound(_)
            | CurrencyError::NoDefault => AppError::NotFound(err.to_string()),
            CurrencyError::InvalidCode(_) | CurrencyError::InvalidPrecision => {
                AppError::Validation(err.to_string())
            }
            CurrencyError::AlreadyExists(_) | CurrencyError::DeleteDefault => {
                AppError::Conflict(err.to_string())
            }
            CurrencyError::Rebuild(_) => AppError::Consistency(err.to_string()),
            CurrencyError::Rate(e) => return Self::from(e),
            CurrencyError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<PriceError> for ApiError {
    fn from(err: PriceError) -> Self {
        Self(match err {
            PriceError::ProductNotFound(_) | PriceError::CurrencyNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            PriceError::NoRate(from, to) => AppError::NoRate(format!("'{from}' -> '{to}'")),
            PriceError::Rate(e) => return Self::from(e),
            PriceError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        Self(match err {
            ProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProductError::InvalidPrice | ProductError::CurrencyNotFound(_) => {
                AppError::Validation(err.to_string())
            }
            ProductError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        Self(AppError::Ingestion(format!("{}: {err}", err.reason())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_expected_statuses() {
        let api: ApiError = RateError::InvalidRate.into();
        assert_eq!(api.0.status_code(), 400);

        let api: ApiError = CurrencyError::NoDefault.into();
        assert_eq!(api.0.status_code(), 404);

        let api: ApiError = CurrencyError::Rebuild("no usable rate".into()).into();
        assert_eq!(api.0.status_code(), 409);

        let api: ApiError = PriceError::NoRate("EUR".into(), "KZT".into()).into();
        assert_eq!(api.0.status_code(), 422);

        let api: ApiError = ProviderError::EmptyResult.into();
        assert_eq!(api.0.status_code(), 502);
    }

    #[test]
    fn test_nested_rate_error_unwraps() {
        let api: ApiError = CurrencyError::Rate(RateError::InvalidRate).into();
        assert_eq!(api.0.status_code(), 400);
        assert_eq!(api.0.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_provider_error_carries_reason() {
        let api: ApiError = ProviderError::BaseMissing("USD".into()).into();
        assert!(api.0.to_string().contains("base_missing"));
    }
}
