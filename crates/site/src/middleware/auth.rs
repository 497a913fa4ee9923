//! Admin authentication gate.
//!
//! The gate has two states per session: anonymous and authenticated. The
//! state is whatever [`current_admin`] finds in the session store for the
//! request's session token.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::{Expiry, Session};

use super::session::SESSION_TTL_SECONDS;
use crate::error::AppError;
use crate::models::{AdminSession, session_keys};

/// Extractor that requires an authenticated admin session.
///
/// Rejects with a 401 JSON error before the handler runs, so anonymous
/// requests never reach the news store.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Logged in since {}", admin.granted_at)
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(AppError::auth_required)?;

        current_admin(&session)
            .await
            .map(Self)
            .ok_or_else(AppError::auth_required)
    }
}

/// The admin grant stored in `session`, if any.
pub async fn current_admin(session: &Session) -> Option<AdminSession> {
    session
        .get::<AdminSession>(session_keys::ADMIN)
        .await
        .ok()
        .flatten()
}

/// Whether `session` is authenticated.
pub async fn is_admin(session: &Session) -> bool {
    current_admin(session).await.is_some()
}

/// Mark the session as authenticated for the next 24 hours.
///
/// The session id is rotated so a token issued before login cannot be
/// reused afterwards.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn grant_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.set_expiry(Some(Expiry::AtDateTime(
        OffsetDateTime::now_utc() + Duration::seconds(SESSION_TTL_SECONDS),
    )));
    session.insert(session_keys::ADMIN, AdminSession::now()).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be removed from the store.
pub async fn revoke_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Compare a supplied password against the configured one in constant time.
#[must_use]
pub fn password_matches(expected: &SecretString, supplied: &str) -> bool {
    constant_time_compare(expected.expose_secret(), supplied)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
