//! Flat-file news store.
//!
//! All news lives in one JSON array in `{data_dir}/news.json`. Every mutation
//! reads the whole file, changes the array and writes the whole file back.
//! There is no locking: with two writers racing, the last write wins.
//!
//! Reads never fail towards callers of [`NewsStore::load`]: a missing,
//! unreadable or malformed file is served as an empty collection. Use
//! [`NewsStore::try_load`] to see the underlying error.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use otechestvo_core::{NewsDraft, NewsError, NewsId, NewsItem, NewsPatch, sort_newest_first};
use thiserror::Error;

/// Name of the news file inside the data directory.
pub const NEWS_FILE_NAME: &str = "news.json";

/// Errors from news store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the news file failed.
    #[error("news file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The news file does not hold a JSON array of news items.
    #[error("news file JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No item has the requested id.
    #[error("news item not found: {0}")]
    NotFound(NewsId),

    /// The submitted fields failed validation.
    #[error("invalid news item: {0}")]
    Invalid(#[from] NewsError),
}

/// Handle to the news file.
///
/// Cheaply cloneable; clones share the id counter.
#[derive(Debug, Clone)]
pub struct NewsStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    last_id: AtomicU64,
}

impl NewsStore {
    /// Open the store in `data_dir`, creating the directory and an empty
    /// news file if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory or file cannot be created.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;

        let path = data_dir.join(NEWS_FILE_NAME);
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, b"[]").await?;
            tracing::info!(path = %path.display(), "initialized empty news file");
        }

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                last_id: AtomicU64::new(0),
            }),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Read the full collection in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read and
    /// `StoreError::Json` if it is not a JSON array of news items.
    pub async fn try_load(&self) -> Result<Vec<NewsItem>, StoreError> {
        let bytes = tokio::fs::read(self.path()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read the full collection in stored order, treating any failure as an
    /// empty collection.
    pub async fn load(&self) -> Vec<NewsItem> {
        match self.try_load().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path().display(),
                    "news file unusable, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Read the collection ordered for the public news list.
    pub async fn load_newest_first(&self) -> Vec<NewsItem> {
        let mut items = self.load().await;
        sort_newest_first(&mut items);
        items
    }

    /// Overwrite the news file with `items`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails.
    pub async fn save(&self, items: &[NewsItem]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(self.path(), json).await?;
        tracing::debug!(count = items.len(), "news file written");
        Ok(())
    }

    /// Add a new item at the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the news file cannot be written.
    pub async fn create(&self, draft: NewsDraft) -> Result<NewsItem, StoreError> {
        let mut items = self.load().await;
        let item = draft.into_item(self.next_id(&items));
        items.insert(0, item.clone());
        self.save(&items).await?;

        tracing::info!(id = %item.id, date = %item.date, "news item created");
        Ok(item)
    }

    /// Apply a partial update to the item with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id,
    /// `StoreError::Invalid` if the patch is rejected, or an I/O error if the
    /// news file cannot be written. The file is untouched on the first two.
    pub async fn update(&self, id: &NewsId, patch: &NewsPatch) -> Result<NewsItem, StoreError> {
        let mut items = self.load().await;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        patch.apply(item)?;
        let updated = item.clone();
        self.save(&items).await?;

        tracing::info!(id = %updated.id, "news item updated");
        Ok(updated)
    }

    /// Remove the item with `id`. Removing an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the news file cannot be written.
    pub async fn delete(&self, id: &NewsId) -> Result<(), StoreError> {
        let mut items = self.load().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        self.save(&items).await?;

        tracing::info!(id = %id, removed = before - items.len(), "news item deleted");
        Ok(())
    }

    /// Next wall-clock id, strictly above every id issued so far and every
    /// numeric id already in `items`.
    fn next_id(&self, items: &[NewsItem]) -> NewsId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let floor = items
            .iter()
            .filter_map(|item| item.id.as_millis())
            .max()
            .unwrap_or_default();
        let next = |last: u64| {
            now.max(last.saturating_add(1))
                .max(floor.saturating_add(1))
        };

        let previous = self
            .inner
            .last_id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        NewsId::from_millis(next(previous))
    }
}
