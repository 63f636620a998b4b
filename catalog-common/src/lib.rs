//! # Catalog Common Library
//!
//! Shared code for the library catalog server and edit UI including:
//! - Domain records and the partial-update payload
//! - API error/response types and bearer token comparison
//! - Configuration loading
//! - Database schema initialization
//! - Normalizers for classification codes, author names and publication info

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod dto;
pub mod error;
pub mod models;
pub mod normalize;

pub use error::{Error, Result};
