//! catalog-ui library - book edit form and its HTTP client
//!
//! `BookForm` holds what the edit dialog shows and turns it back into a
//! partial update. `EditSession` drives load, prefill and submit against
//! the catalog server.

pub mod client;
pub mod form;
pub mod session;

pub use client::{CatalogClient, ClientError};
pub use form::{BookForm, PublisherChoice};
pub use session::{EditSession, Notice, NoticeKind};
