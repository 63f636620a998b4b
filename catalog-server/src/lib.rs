//! catalog-server library - REST CRUD over the library catalog
//!
//! Books with their authors, classification codes (BBK, UDC, GRNTI),
//! publication places and raw legacy codes, plus search/create endpoints
//! for each dictionary.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Bearer token expected on protected routes; `None` disables the guard
    pub api_token: Option<String>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, api_token: Option<String>) -> Self {
        let api_token = api_token.filter(|t| !t.trim().is_empty());
        Self { db, api_token }
    }
}

/// Build application router
///
/// `/health` and `/buildinfo` stay open; everything else passes the
/// bearer guard.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    // Protected routes (require authentication)
    let protected = Router::new()
        .merge(api::book_routes())
        .merge(api::dictionary_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::buildinfo_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
