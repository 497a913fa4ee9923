//! News management commands.
//!
//! These go through the same [`NewsStore`] and validation as the web admin,
//! so the site picks up changes on its next read.
//!
//! # Usage
//!
//! ```bash
//! otechestvo-cli news list
//! otechestvo-cli news add --date 01.09.2024 --content "Открытие сезона"
//! otechestvo-cli news edit 1725148800000 --content "Исправленный текст"
//! otechestvo-cli news remove 1725148800000
//! ```

use otechestvo_core::{NewsDraft, NewsId, NewsItem, NewsPatch};
use otechestvo_site::store::{NewsStore, StoreError};
use thiserror::Error;

/// Errors from news commands.
#[derive(Debug, Error)]
pub enum NewsCommandError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `edit` was called without any field to change.
    #[error("Nothing to change: pass --date and/or --content")]
    NothingToChange,
}

/// All local news items, newest first.
///
/// Unlike the public API this reports a malformed news file instead of
/// listing nothing.
///
/// # Errors
///
/// Returns an error if the news file cannot be read or parsed.
pub async fn list(store: &NewsStore) -> Result<Vec<NewsItem>, NewsCommandError> {
    let mut items = store.try_load().await?;
    otechestvo_core::sort_newest_first(&mut items);
    Ok(items)
}

/// Create a news item.
///
/// # Errors
///
/// Returns an error if a field is blank or the file cannot be written.
pub async fn add(
    store: &NewsStore,
    date: &str,
    content: &str,
) -> Result<NewsItem, NewsCommandError> {
    let draft = NewsDraft::new(date, content).map_err(StoreError::from)?;
    let item = store.create(draft).await?;
    tracing::info!(id = %item.id, "news item created");
    Ok(item)
}

/// Change the date and/or content of a news item.
///
/// # Errors
///
/// Returns an error if neither field is given, the id is unknown, the new
/// content is blank, or the file cannot be written.
pub async fn edit(
    store: &NewsStore,
    id: &str,
    date: Option<String>,
    content: Option<String>,
) -> Result<NewsItem, NewsCommandError> {
    let patch = NewsPatch { date, content };
    if patch.is_empty() {
        return Err(NewsCommandError::NothingToChange);
    }

    let item = store.update(&NewsId::new(id), &patch).await?;
    tracing::info!(id = %item.id, "news item updated");
    Ok(item)
}

/// Delete a news item. Returns whether an item was actually removed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub async fn remove(store: &NewsStore, id: &str) -> Result<bool, NewsCommandError> {
    let id = NewsId::new(id);
    let existed = store.try_load().await?.iter().any(|item| item.id == id);
    store.delete(&id).await?;

    if existed {
        tracing::info!(%id, "news item removed");
    } else {
        tracing::warn!(%id, "no news item with this id");
    }
    Ok(existed)
}

/// One line per item: `id  date  content`.
#[must_use]
pub fn format_item(item: &NewsItem) -> String {
    format!("{}\t{}\t{}", item.id, item.date, item.content)
}
