//! Core types for Otechestvo.
//!
//! This module provides type-safe wrappers for the news domain.

pub mod id;
pub mod news;

pub use id::NewsId;
pub use news::{NewsDraft, NewsError, NewsItem, NewsPatch, display_date, sort_newest_first};
