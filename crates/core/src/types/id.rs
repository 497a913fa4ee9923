//! News identifiers.
//!
//! Locally authored items get ids derived from wall-clock milliseconds, while
//! items mirrored from the external wall reuse the remote post id. Both are
//! carried as opaque strings so the JSON file keeps the shape `{"id": "..."}`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a news item.
///
/// # Example
///
/// ```rust
/// # use otechestvo_core::NewsId;
/// let id = NewsId::from_millis(1_704_067_200_000);
/// assert_eq!(id.as_str(), "1704067200000");
/// assert_eq!(id.as_millis(), Some(1_704_067_200_000));
///
/// let external = NewsId::new("wall-42");
/// assert_eq!(external.as_millis(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsId(String);

impl NewsId {
    /// Create an ID from any string token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an ID from a millisecond timestamp.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    /// Numeric value of the token, if it is a plain decimal number.
    #[must_use]
    pub fn as_millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Get the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NewsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NewsId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NewsId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}
