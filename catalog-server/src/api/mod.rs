//! HTTP API handlers for catalog-server

pub mod auth;
pub mod books;
pub mod buildinfo;
pub mod dictionaries;
pub mod health;

pub use auth::auth_middleware;
pub use books::book_routes;
pub use buildinfo::{buildinfo_routes, get_build_info};
pub use dictionaries::dictionary_routes;
pub use health::health_routes;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::ApiError;

/// Decode a JSON request body, reporting malformed input as 400
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Like [`parse_json`], but a blank body yields the default value
pub(crate) fn parse_json_or_default<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(body)
}
