//! Dictionary endpoints: search (`GET ?q=`) and create (`POST`)
//!
//! Searches return at most 25 rows; a blank term returns an empty list.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_common::dto::{NewAuthor, NewCode, NewPublisher};
use catalog_common::models::{Author, Bbk, Grnti, Publisher, Udc};
use serde::Deserialize;

use super::parse_json;
use crate::{db, ApiResult, AppState};

/// `?q=` of a dictionary search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /authors?q=
pub async fn search_authors(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(db::search_authors(&state.db, query.q.as_deref()).await?))
}

/// POST /authors
pub async fn create_author(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Author>)> {
    let new: NewAuthor = parse_json(&body)?;
    let author = db::create_author(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn search_bbk(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Bbk>>> {
    Ok(Json(db::search_bbk(&state.db, query.q.as_deref()).await?))
}

pub async fn create_bbk(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Bbk>)> {
    let new: NewCode = parse_json(&body)?;
    Ok((StatusCode::CREATED, Json(db::create_bbk(&state.db, &new).await?)))
}

pub async fn search_udc(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Udc>>> {
    Ok(Json(db::search_udc(&state.db, query.q.as_deref()).await?))
}

pub async fn create_udc(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Udc>)> {
    let new: NewCode = parse_json(&body)?;
    Ok((StatusCode::CREATED, Json(db::create_udc(&state.db, &new).await?)))
}

/// GET /grnti?q=
///
/// Sent with `Cache-Control: no-store` so the edit form never sees a
/// stale suggestion list.
pub async fn search_grnti(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let rows: Vec<Grnti> = db::search_grnti(&state.db, query.q.as_deref()).await?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(rows)))
}

pub async fn create_grnti(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Grnti>)> {
    let new: NewCode = parse_json(&body)?;
    Ok((StatusCode::CREATED, Json(db::create_grnti(&state.db, &new).await?)))
}

pub async fn search_publishers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Publisher>>> {
    Ok(Json(db::search_publishers(&state.db, query.q.as_deref()).await?))
}

pub async fn create_publisher(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Publisher>)> {
    let new: NewPublisher = parse_json(&body)?;
    Ok((StatusCode::CREATED, Json(db::create_publisher(&state.db, &new).await?)))
}

pub fn dictionary_routes() -> Router<AppState> {
    Router::new()
        .route("/authors", get(search_authors).post(create_author))
        .route("/bbk", get(search_bbk).post(create_bbk))
        .route("/udc", get(search_udc).post(create_udc))
        .route("/grnti", get(search_grnti).post(create_grnti))
        .route("/publishers", get(search_publishers).post(create_publisher))
}
