//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//!
//! # News
//! GET    /api/news            - Local news, newest first
//! GET    /api/vk-news         - Mirrored VK wall posts (empty if unavailable)
//! GET    /api/feed            - VK posts if there are at least 3, local news otherwise
//! POST   /api/news            - Create (admin)
//! PUT    /api/news/{id}       - Partial update (admin)
//! DELETE /api/news/{id}       - Delete (admin)
//!
//! # Admin session
//! POST   /api/admin/login     - Exchange the admin password for a session
//! POST   /api/admin/logout    - Destroy the session
//! GET    /api/admin/check     - Report whether the session is authenticated
//! ```
//!
//! Every other path is served from the static site directory.

pub mod admin;
pub mod news;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// `{"ok": true}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

/// Create the admin session routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/check", get(admin::check))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(news::list).post(news::create))
        .route("/news/{id}", put(news::update).delete(news::delete))
        .route("/vk-news", get(news::vk_news))
        .route("/feed", get(news::feed))
        .nest("/admin", admin_routes())
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
