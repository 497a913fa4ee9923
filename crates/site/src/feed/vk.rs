//! VK wall client.
//!
//! Calls the `wall.get` API method for the configured community and maps the
//! mirrored posts into [`NewsItem`]s.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use otechestvo_core::{NewsId, NewsItem};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::{FeedError, collapse, window};
use crate::config::{VK_API_VERSION, VkConfig};

/// Raw posts requested per call: the skipped window plus the mirrored one.
const FETCH_COUNT: usize = super::FEED_SKIP + super::FEED_TAKE;

/// Maximum length of mirrored post text, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Offset used to render post dates (Moscow time, no DST).
const DISPLAY_OFFSET_SECONDS: i32 = 3 * 60 * 60;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// VK API client for the community wall.
#[derive(Clone)]
pub struct VkClient {
    client: reqwest::Client,
    access_token: Option<SecretString>,
    group_id: u64,
    api_base: String,
}

impl VkClient {
    /// Create a new VK client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &VkConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            access_token: config.access_token.clone(),
            group_id: config.group_id,
            api_base: config.api_base.clone(),
        })
    }

    /// Fetch the mirrored posts.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::MissingToken` without a token, `FeedError::Api` if
    /// VK answers with an error object, and `FeedError::Http` for transport
    /// or decoding failures.
    pub async fn fetch(&self) -> Result<Vec<NewsItem>, FeedError> {
        let token = self.access_token.as_ref().ok_or(FeedError::MissingToken)?;
        let url = self.wall_url(token)?;

        let body: WallResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = body.error {
            return Err(FeedError::Api {
                code: error.error_code,
                message: error.error_msg,
            });
        }

        let posts = body.response.map(|page| page.items).unwrap_or_default();
        let items: Vec<NewsItem> = window(posts)
            .into_iter()
            .filter_map(|post| map_post(post, self.group_id))
            .collect();

        tracing::debug!(count = items.len(), "fetched VK wall posts");
        Ok(items)
    }

    /// Fetch the mirrored posts, degrading any failure to an empty list.
    pub async fn fetch_or_empty(&self) -> Vec<NewsItem> {
        collapse(self.fetch().await)
    }

    /// Build the `wall.get` request URL.
    fn wall_url(&self, token: &SecretString) -> Result<Url, url::ParseError> {
        let owner_id = format!("-{}", self.group_id);
        let count = FETCH_COUNT.to_string();
        Url::parse_with_params(
            &format!("{}/wall.get", self.api_base.trim_end_matches('/')),
            &[
                ("owner_id", owner_id.as_str()),
                ("count", count.as_str()),
                ("filter", "owner"),
                ("access_token", token.expose_secret()),
                ("v", VK_API_VERSION),
            ],
        )
    }
}

/// Top-level `wall.get` response: either `response` or `error` is set.
#[derive(Debug, Deserialize)]
struct WallResponse {
    #[serde(default)]
    response: Option<WallPage>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WallPage {
    #[serde(default)]
    items: Vec<WallPost>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// A single wall post, reduced to the fields the mirror uses.
#[derive(Debug, Clone, Deserialize)]
pub struct WallPost {
    pub id: i64,
    /// Unix timestamp, seconds.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

/// Map a wall post to a news item. Posts with an out-of-range timestamp are
/// dropped.
#[must_use]
pub fn map_post(post: WallPost, group_id: u64) -> Option<NewsItem> {
    let Some(date) = format_post_date(post.date) else {
        tracing::warn!(post_id = post.id, timestamp = post.date, "skipping VK post with bad date");
        return None;
    };

    Some(NewsItem {
        id: NewsId::new(post.id.to_string()),
        date,
        content: flatten_text(post.text.as_deref().unwrap_or_default()),
        link: Some(format!("https://vk.com/wall-{group_id}_{}", post.id)),
    })
}

/// Render a unix timestamp as `DD.MM.YYYY` in Moscow time.
fn format_post_date(timestamp: i64) -> Option<String> {
    let offset = FixedOffset::east_opt(DISPLAY_OFFSET_SECONDS)?;
    let utc = DateTime::from_timestamp(timestamp, 0)?;
    Some(utc.with_timezone(&offset).format("%d.%m.%Y").to_string())
}

/// Replace newlines with spaces, trim and cut to [`MAX_CONTENT_CHARS`].
fn flatten_text(text: &str) -> String {
    text.replace('\n', " ")
        .trim()
        .chars()
        .take(MAX_CONTENT_CHARS)
        .collect()
}
