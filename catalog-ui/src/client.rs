//! HTTP client for the catalog server

use std::time::Duration;

use catalog_common::api::ErrorResponse;
use catalog_common::dto::UpdateBook;
use catalog_common::models::{Author, Bbk, BookDetail, Grnti, Publisher, Udc};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

const USER_AGENT: &str = concat!("catalog-ui/", env!("CARGO_PKG_VERSION"));

/// Catalog client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer; `message` is the server's own text when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Catalog server API client
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CatalogClient {
    /// `base_url` like `http://127.0.0.1:5730`; `token` is sent as a bearer credential
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path));

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    pub async fn get_book(&self, id: i64) -> Result<BookDetail, ClientError> {
        self.send(self.request(Method::GET, &format!("/books/{}", id)))
            .await
    }

    /// Send a partial update and return the book as stored afterwards
    pub async fn update_book(&self, id: i64, update: &UpdateBook) -> Result<BookDetail, ClientError> {
        tracing::debug!(book_id = id, "Submitting book update");
        self.send(
            self.request(Method::PUT, &format!("/books/{}", id))
                .json(update),
        )
        .await
    }

    async fn search<T: DeserializeOwned>(&self, path: &str, q: &str) -> Result<Vec<T>, ClientError> {
        self.send(self.request(Method::GET, path).query(&[("q", q)]))
            .await
    }

    pub async fn search_grnti(&self, q: &str) -> Result<Vec<Grnti>, ClientError> {
        self.search("/grnti", q).await
    }

    pub async fn search_bbk(&self, q: &str) -> Result<Vec<Bbk>, ClientError> {
        self.search("/bbk", q).await
    }

    pub async fn search_udc(&self, q: &str) -> Result<Vec<Udc>, ClientError> {
        self.search("/udc", q).await
    }

    pub async fn search_authors(&self, q: &str) -> Result<Vec<Author>, ClientError> {
        self.search("/authors", q).await
    }

    pub async fn search_publishers(&self, q: &str) -> Result<Vec<Publisher>, ClientError> {
        self.search("/publishers", q).await
    }
}

/// Turn a non-2xx response into `ClientError::Api`
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_dropped() {
        let client = CatalogClient::new("http://localhost:5730/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:5730");
    }

    #[test]
    fn test_empty_token_not_sent() {
        let client = CatalogClient::new("http://localhost:5730", Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 404,
            message: "Book 9 not found".to_string(),
        };
        assert_eq!(err.to_string(), "Book 9 not found");
        assert_eq!(err.status(), Some(404));
    }
}
