//! Typed REST client for the shop backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local sync, direct API calls
//! - Catalog reads (categories, products) are cached in-memory via `moka`
//!   with a 5 minute TTL; cart and order calls are never cached
//! - The backend keys the session cart on its session cookie; the client's
//!   cookie store carries it across calls for the life of the process
//!
//! # Example
//!
//! ```rust,ignore
//! use haberdash_storefront::api::Client;
//!
//! let client = Client::new(&config.shop_api)?;
//!
//! // Browse the catalog
//! let product = client.get_product("wool-fedora").await?;
//!
//! // Put two in the cart
//! let mutation = client.add_cart_item(product.id, 2).await?;
//! assert_eq!(mutation.cart.total_items, 2);
//! ```

mod cache;
mod client;
pub mod types;

pub use client::Client;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned 404 for the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend returned a non-success status other than 404.
    #[error("Backend returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body, truncated.
        detail: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
