//! Shop backend REST client implementation.
//!
//! Uses `reqwest` for HTTP with a cookie store (the backend's session cookie
//! keys the cart) and `moka` for catalog response caching (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use haberdash_core::{OrderId, ProductId};

use crate::api::ApiError;
use crate::api::cache::CacheValue;
use crate::api::types::{
    AddItemRequest, Cart, CartMutation, CartRemoval, Category, CheckoutRequest, Order,
    OrderSummary, Page, Product, ProductDetail, UpdateItemRequest,
};
use crate::config::ShopApiConfig;

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the shop backend REST API.
///
/// Provides typed access to the catalog, cart, and order endpoints.
/// Categories and products are cached for 5 minutes.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    /// Base URL without trailing slash; endpoint paths start with `/`.
    base: String,
    cache: Cache<String, CacheValue>,
}

impl Client {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ShopApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        // The backend keys the session cart on its session cookie; the
        // cookie store makes this process one continuous session.
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        let base = config.base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(ClientInner { http, base, cache }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }

    /// Decode a response, mapping status codes to the error taxonomy.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %truncate(&text, 500),
                "shop API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: truncate(&text, 200),
            });
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path,
                    body = %truncate(&text, 500),
                    "failed to parse shop API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Page<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(page);
        }

        let page: Page<Category> = self.get_json("/api/categories/", &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(page.clone()))
            .await;

        Ok(page)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category(&self, slug: &str) -> Result<Category, ApiError> {
        let cache_key = format!("category:{slug}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self
            .get_json(&format!("/api/categories/{slug}/"), &[])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Get a paginated list of products, optionally filtered by category slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<&str>,
        page: Option<u32>,
    ) -> Result<Page<Product>, ApiError> {
        let cache_key = format!(
            "products:{}:{}",
            category.unwrap_or(""),
            page.unwrap_or(1)
        );

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }

        let products: Page<Product> = self.get_json("/api/products/", &query).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its slug, including the full image list.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<ProductDetail, ApiError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: ProductDetail = self
            .get_json(&format!("/api/products/{slug}/"), &[])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the current session cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.get_json("/api/cart/", &[]).await
    }

    /// Add units of a product to the cart.
    ///
    /// Quantity bounds are enforced server-side (`quantity >= 1`); the client
    /// does not duplicate the check.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartMutation, ApiError> {
        let path = "/api/cart/items/";
        let response = self
            .inner
            .http
            .post(self.url(path))
            .json(&AddItemRequest {
                product_id,
                quantity,
            })
            .send()
            .await?;
        Self::decode(path, response).await
    }

    /// Set the absolute quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not present or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartMutation, ApiError> {
        let path = format!("/api/cart/items/{product_id}/");
        let response = self
            .inner
            .http
            .patch(self.url(&path))
            .json(&UpdateItemRequest { quantity })
            .send()
            .await?;
        Self::decode(&path, response).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not present or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_cart_item(&self, product_id: ProductId) -> Result<CartRemoval, ApiError> {
        let path = format!("/api/cart/items/{product_id}/");
        let response = self.inner.http.delete(self.url(&path)).send().await?;
        Self::decode(&path, response).await
    }

    /// Empty the cart in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        let path = "/api/cart/";
        let response = self.inner.http.delete(self.url(path)).send().await?;
        Self::decode(path, response).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order from the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        let path = "/api/orders/checkout/";
        let response = self
            .inner
            .http
            .post(self.url(path))
            .json(request)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    /// Get an order by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, ApiError> {
        self.get_json(&format!("/api/orders/{order_id}/"), &[])
            .await
    }

    /// Get a paginated list of past orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: Option<u32>) -> Result<Page<OrderSummary>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        self.get_json("/api/orders/", &query).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
