//! Bearer token guard for protected routes
//!
//! Applied to everything except `/health` and `/buildinfo`. A server
//! started without a token lets every request through.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use catalog_common::api::check_authorization;
use tracing::warn;

use crate::{ApiError, AppState};

/// Authentication middleware
///
/// Returns 401 Unauthorized when the `Authorization: Bearer` header is
/// missing or carries the wrong token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = check_authorization(header, state.api_token.as_deref()) {
        warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        return Err(ApiError::Unauthorized(e.to_string()));
    }

    Ok(next.run(request).await)
}
