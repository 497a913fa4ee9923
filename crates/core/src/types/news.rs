//! News entries and their validation rules.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::NewsId;

/// Errors that can occur when validating news input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NewsError {
    /// The date is empty after trimming.
    #[error("date cannot be empty")]
    EmptyDate,
    /// The content is empty after trimming.
    #[error("content cannot be empty")]
    EmptyContent,
}

/// A single news entry.
///
/// `date` is a free-form display string (normally `DD.MM.YYYY`), not a
/// calendar type. `link` is only set for items mirrored from the external
/// wall and is omitted from JSON when absent, so locally authored items never
/// persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: NewsId,
    pub date: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Validated input for a new locally authored item.
///
/// ## Example
///
/// ```
/// use otechestvo_core::{NewsDraft, NewsError};
///
/// let draft = NewsDraft::new(" 01.01.2024 ", "  Hello ").unwrap();
/// assert_eq!(draft.date(), "01.01.2024");
/// assert_eq!(draft.content(), "Hello");
///
/// assert_eq!(NewsDraft::new("01.01.2024", "   ").unwrap_err(), NewsError::EmptyContent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDraft {
    date: String,
    content: String,
}

impl NewsDraft {
    /// Trim and validate a date/content pair.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::EmptyDate`] or [`NewsError::EmptyContent`] if the
    /// corresponding field is blank.
    pub fn new(date: &str, content: &str) -> Result<Self, NewsError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(NewsError::EmptyDate);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(NewsError::EmptyContent);
        }

        Ok(Self {
            date: date.to_owned(),
            content: content.to_owned(),
        })
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Turn the draft into an item with the given id.
    #[must_use]
    pub fn into_item(self, id: NewsId) -> NewsItem {
        NewsItem {
            id,
            date: self.date,
            content: self.content,
            link: None,
        }
    }
}

/// Partial update of an existing item.
///
/// Only fields that are present are applied. A blank `date` counts as not
/// provided; blank `content` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsPatch {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl NewsPatch {
    /// Apply the patch in place.
    ///
    /// The item is left untouched when the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::EmptyContent`] if `content` is present but blank.
    pub fn apply(&self, item: &mut NewsItem) -> Result<(), NewsError> {
        let content = match self.content.as_deref().map(str::trim) {
            Some("") => return Err(NewsError::EmptyContent),
            other => other,
        };

        if let Some(date) = self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            date.clone_into(&mut item.date);
        }
        if let Some(content) = content {
            content.clone_into(&mut item.content);
        }

        Ok(())
    }

    /// Whether the patch carries no applicable change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.as_deref().is_none_or(|d| d.trim().is_empty()) && self.content.is_none()
    }
}

/// Parse a `day.month.year` display date.
///
/// `/` and `-` are accepted as separators too. Returns `None` for anything
/// that is not a real calendar day.
#[must_use]
pub fn display_date(date: &str) -> Option<NaiveDate> {
    let mut parts = date.trim().split(['.', '/', '-']);
    let day = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    let year = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Order items newest first by their display date.
///
/// The sort is stable: items with equal dates keep their collection order,
/// and items whose date cannot be parsed go after all dated ones.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by_cached_key(|item| Reverse(display_date(&item.date)));
}
