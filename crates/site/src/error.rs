//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All API handlers return
//! `Result<T, AppError>`; every error body is JSON `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// User-facing error messages, shown as-is by the admin page.
pub mod messages {
    pub const AUTH_REQUIRED: &str = "Требуется авторизация";
    pub const WRONG_PASSWORD: &str = "Неверный пароль";
    pub const MISSING_FIELDS: &str = "Укажите дату и текст";
    pub const EMPTY_CONTENT: &str = "Текст новости не может быть пустым";
    pub const NEWS_NOT_FOUND: &str = "Новость не найдена";
    pub const INTERNAL: &str = "Внутренняя ошибка сервера";
}

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// News store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Caller is not authenticated or supplied a wrong password.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing or invalid request fields.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// The 401 returned to anonymous callers of admin endpoints.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::Unauthorized(messages::AUTH_REQUIRED.to_string())
    }

    fn is_server_error(&self) -> bool {
        match self {
            Self::Store(err) => matches!(err, StoreError::Io(_) | StoreError::Json(_)),
            Self::Session(_) => true,
            Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
                StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) => messages::NEWS_NOT_FOUND.to_string(),
                StoreError::Invalid(otechestvo_core::NewsError::EmptyContent) => {
                    messages::EMPTY_CONTENT.to_string()
                }
                StoreError::Invalid(_) => messages::MISSING_FIELDS.to_string(),
                // Don't expose file system details to clients
                StoreError::Io(_) | StoreError::Json(_) => messages::INTERNAL.to_string(),
            },
            Self::Session(_) => messages::INTERNAL.to_string(),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
