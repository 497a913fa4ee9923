//! Otechestvo Core - Shared news types.
//!
//! This crate provides the types used by every Otechestvo component:
//! - `site` - Public website, news API and admin endpoints
//! - `cli` - Command-line tools for managing the news file
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. Persistence lives in the site crate's news store.
//!
//! # Modules
//!
//! - [`types`] - News identifiers, items, drafts, patches and date ordering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
