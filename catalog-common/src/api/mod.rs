//! API module for shared HTTP API functionality
//!
//! Provides bearer token checking and the error body shared by the server
//! and the edit UI client.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The server wraps these with axum middleware.

pub mod auth;
pub mod types;

pub use auth::{bearer_token, check_authorization, token_matches, ApiAuthError};
pub use types::ErrorResponse;
