//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored admin grant.
///
/// There is a single shared admin password and no user identity, so the
/// grant only records when it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// When the password was accepted.
    pub granted_at: DateTime<Utc>,
}

impl AdminSession {
    /// A grant issued now.
    #[must_use]
    pub fn now() -> Self {
        Self {
            granted_at: Utc::now(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the admin grant.
    pub const ADMIN: &str = "admin";
}
