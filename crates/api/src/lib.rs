//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for currencies, rates, and product prices
//! - Error to HTTP response mapping
//!
//! Authentication and authorization live in the gateway in front of this
//! service; the routes here are the plain data operations.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use valuta_core::ingest::RateProvider;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// External rate provider client.
    pub provider: Arc<RateProvider>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
