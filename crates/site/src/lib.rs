//! Otechestvo site library.
//!
//! This crate provides the site's server as a library, allowing it to be
//! tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::MemoryStore;
use tracing::Span;

use state::AppState;

/// Build the full application router.
///
/// `sessions` is the session store the admin gate reads from; pass the same
/// store to every router that should share logins.
pub fn build_router(state: AppState, sessions: MemoryStore) -> Router {
    let session_layer = middleware::create_session_layer(sessions, state.config());
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(routes::routes())
        .fallback_service(static_files)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
