//! External news feed and read path selection.
//!
//! The site mirrors a few posts from the organization's VK wall. The newest
//! posts on that wall are already announced in a separate channel on the
//! page, so the mirror skips the first [`FEED_SKIP`] posts and shows the
//! next [`FEED_TAKE`].
//!
//! Fetch failures are modelled as [`FeedError`] and collapsed to an empty
//! list by [`collapse`], which is the only place the error is dropped.

pub mod vk;

use otechestvo_core::NewsItem;
use thiserror::Error;

pub use vk::VkClient;

/// Number of most recent wall posts left out of the mirror.
pub const FEED_SKIP: usize = 3;

/// Number of wall posts mirrored after the skipped ones.
pub const FEED_TAKE: usize = 3;

/// Minimum number of external items needed to replace the local news list.
pub const MIN_EXTERNAL_ITEMS: usize = 3;

/// Errors that can occur when fetching the external feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No access token is configured.
    #[error("no access token configured")]
    MissingToken,

    /// HTTP request failed or the body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with an error object.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

/// Take the mirrored window out of the raw posts, newest first.
pub fn window<T>(posts: impl IntoIterator<Item = T>) -> Vec<T> {
    posts.into_iter().skip(FEED_SKIP).take(FEED_TAKE).collect()
}

/// Collapse a feed result to a plain list, logging the failure.
pub fn collapse(result: Result<Vec<NewsItem>, FeedError>) -> Vec<NewsItem> {
    match result {
        Ok(items) => items,
        Err(FeedError::MissingToken) => {
            tracing::debug!("external feed disabled, no access token");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "external feed unavailable, serving empty list");
            Vec::new()
        }
    }
}

/// Pick the list served on the public news block.
///
/// External items are served on their own once there are at least
/// [`MIN_EXTERNAL_ITEMS`] of them; otherwise the local list is served. The
/// two are never merged.
#[must_use]
pub fn select_news(external: Vec<NewsItem>, local: Vec<NewsItem>) -> Vec<NewsItem> {
    if external.len() >= MIN_EXTERNAL_ITEMS {
        external
    } else {
        local
    }
}
