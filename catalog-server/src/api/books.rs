//! Book endpoints
//!
//! `PUT /books/:id` accepts a partial update. Fields left out of the body
//! keep their stored value, and an empty body changes nothing.

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_common::dto::{CreateBook, UpdateBook};
use catalog_common::models::{BookDetail, BookSummary, Paginated};
use serde::Deserialize;

use super::parse_json_or_default;
use crate::pagination::DEFAULT_LIMIT;
use crate::{db, ApiError, ApiResult, AppState};

/// Query parameters of `GET /books`
#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    /// Case-insensitive title filter
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn book_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid book id: {}", e.body_text())))
}

/// GET /books?q=&page=&limit=
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<BookListQuery>, QueryRejection>,
) -> ApiResult<Json<Paginated<BookSummary>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = db::list_books(&state.db, query.q.as_deref(), query.page, query.limit).await?;
    Ok(Json(page))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<BookDetail>> {
    let id = book_id(path)?;
    db::load_book(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", id)))
}

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<BookDetail>)> {
    let dto: CreateBook = parse_json_or_default(&body)?;
    let book = db::create_book(&state.db, &dto).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<Json<BookDetail>> {
    let id = book_id(path)?;
    let dto: UpdateBook = parse_json_or_default(&body)?;
    let book = db::update_book(&state.db, id, &dto).await?;
    Ok(Json(book))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = book_id(path)?;
    db::delete_book(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
}
