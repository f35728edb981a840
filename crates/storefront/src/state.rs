//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, Client};
use crate::config::StorefrontConfig;
use crate::services::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the backend API client, and the cart store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: Client,
    cart: CartStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The cart store shares the API client so every cart mutation rides the
    /// same backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = Client::new(&config.shop_api)?;
        let cart = CartStore::new(api.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api, cart }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &Client {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
