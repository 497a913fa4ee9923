//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::feed::{FeedError, VkClient};
use crate::store::NewsStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the news store and the VK client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: NewsStore,
    vk: VkClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the VK HTTP client cannot be built.
    pub fn new(config: SiteConfig, store: NewsStore) -> Result<Self, FeedError> {
        let vk = VkClient::new(&config.vk)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, store, vk }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the news store.
    #[must_use]
    pub fn store(&self) -> &NewsStore {
        &self.inner.store
    }

    /// Get a reference to the VK wall client.
    #[must_use]
    pub fn vk(&self) -> &VkClient {
        &self.inner.vk
    }
}
