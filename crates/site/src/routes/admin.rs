//! Admin session handlers.

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::OkResponse;
use crate::error::{AppError, Result, messages};
use crate::middleware::{grant_admin, is_admin, password_matches, revoke_admin};
use crate::state::AppState;

/// Body of `POST /api/admin/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Login body from either a JSON request or a plain HTML form post.
///
/// A missing or unreadable body yields an empty request, which then fails
/// the password check like any wrong password.
pub struct LoginBody(pub LoginRequest);

impl<S> FromRequest<S> for LoginBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let request = if is_form {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(request)| request)
                .ok()
        } else {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(request)| request)
                .ok()
        };

        Ok(Self(request.unwrap_or_default()))
    }
}

/// Body of `GET /api/admin/check`.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub admin: bool,
}

/// Exchange the admin password for an authenticated session.
///
/// POST /api/admin/login
///
/// Accepts `{"password": "..."}` as JSON or `password=...` as a form post.
///
/// # Errors
///
/// 401 for a wrong or missing password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    LoginBody(request): LoginBody,
) -> Result<Json<OkResponse>> {
    let password = request.password.unwrap_or_default();

    if !password_matches(&state.config().admin_password, &password) {
        tracing::warn!("admin login rejected");
        return Err(AppError::Unauthorized(messages::WRONG_PASSWORD.to_string()));
    }

    grant_admin(&session).await?;
    tracing::info!("admin logged in");
    Ok(Json(OkResponse::ok()))
}

/// Destroy the current session.
///
/// POST /api/admin/logout
///
/// # Errors
///
/// 500 if the session store fails.
pub async fn logout(session: Session) -> Result<Json<OkResponse>> {
    revoke_admin(&session).await?;
    tracing::info!("admin logged out");
    Ok(Json(OkResponse::ok()))
}

/// Report whether the current session is authenticated.
///
/// GET /api/admin/check
pub async fn check(session: Session) -> Json<CheckResponse> {
    Json(CheckResponse {
        admin: is_admin(&session).await,
    })
}
