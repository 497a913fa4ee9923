//! Session middleware configuration.
//!
//! Sessions live in the in-process `MemoryStore` and are addressed by an
//! opaque id carried in a signed cookie. Sessions are lost on restart.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "otechestvo_session";

/// Lifetime of an admin session from login, in seconds (24 hours).
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// The cookie is signed with a key derived from the configured session
/// secret, so secrets of any length are usable.
#[must_use]
pub fn create_session_layer(
    store: MemoryStore,
    config: &SiteConfig,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config.session_secret.expose_secret()))
}

/// Derive the 64-byte cookie signing key from the session secret.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
