//! News API handlers.
//!
//! Reads are public. Mutations require an admin session; the
//! [`RequireAdmin`] extractor runs before the body is even parsed.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use otechestvo_core::{NewsDraft, NewsId, NewsItem, NewsPatch};
use serde::Deserialize;

use super::OkResponse;
use crate::error::{AppError, Result, messages};
use crate::feed::select_news;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body of `POST /api/news`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateNewsRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Local news, newest first.
///
/// GET /api/news
pub async fn list(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.store().load_newest_first().await)
}

/// Mirrored VK wall posts; empty when the wall is unavailable.
///
/// GET /api/vk-news
pub async fn vk_news(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.vk().fetch_or_empty().await)
}

/// The list shown in the news block: VK posts when there are enough of
/// them, the local news otherwise.
///
/// GET /api/feed
pub async fn feed(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    let (external, local) = tokio::join!(
        state.vk().fetch_or_empty(),
        state.store().load_newest_first()
    );
    Json(select_news(external, local))
}

/// Create a news item.
///
/// POST /api/news
///
/// # Errors
///
/// 400 if `date` or `content` is missing or blank, 401 without a session.
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateNewsRequest>, JsonRejection>,
) -> Result<Json<NewsItem>> {
    let Json(request) = body.map_err(|_| missing_fields())?;

    let draft = NewsDraft::new(
        request.date.as_deref().unwrap_or_default(),
        request.content.as_deref().unwrap_or_default(),
    )
    .map_err(|_| missing_fields())?;

    Ok(Json(state.store().create(draft).await?))
}

/// Partially update a news item.
///
/// PUT /api/news/{id}
///
/// A missing or unreadable body is an empty patch: the item comes back
/// unchanged.
///
/// # Errors
///
/// 404 for an unknown id, 400 for blank content, 401 without a session.
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<NewsPatch>, JsonRejection>,
) -> Result<Json<NewsItem>> {
    let patch = body.map(|Json(patch)| patch).unwrap_or_default();
    let updated = state.store().update(&NewsId::new(id), &patch).await?;
    Ok(Json(updated))
}

/// Delete a news item. Unknown ids succeed.
///
/// DELETE /api/news/{id}
///
/// # Errors
///
/// 401 without a session.
pub async fn delete(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    state.store().delete(&NewsId::new(id)).await?;
    Ok(Json(OkResponse::ok()))
}

fn missing_fields() -> AppError {
    AppError::BadRequest(messages::MISSING_FIELDS.to_string())
}
