//! Integration tests for Haberdash.
//!
//! Each test spawns two in-process servers on ephemeral ports:
//!
//! 1. A **stub backend** implementing the shop REST contract (catalog, cart,
//!    orders) with in-memory state and the same envelope shapes as the real
//!    service, and
//! 2. The **storefront** itself, pointed at that backend.
//!
//! Tests then drive the storefront over HTTP like a browser would, and can
//! also inspect the shared [`AppState`] directly (the spawned server and the
//! test hold clones of the same state).
//!
//! # Test Categories
//!
//! - `storefront_pages` - Catalog browsing and not-found states
//! - `storefront_cart` - Cart mutations and quantity policies
//! - `storefront_checkout` - Checkout validation and order confirmation

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use haberdash_core::{
    AddressId, CategoryId, OrderId, OrderItemId, OrderStatus, Price, ProductId, ProductImageId,
};
use haberdash_storefront::api::types::{
    AddItemRequest, Cart, CartItem, CartMutation, CartRemoval, Category, CheckoutRequest, Order,
    OrderItem, OrderSummary, Page, Product, ProductDetail, ProductImage, ShippingAddress,
};
use haberdash_storefront::config::{ShopApiConfig, StorefrontConfig};
use haberdash_storefront::routes;
use haberdash_storefront::state::AppState;

// =============================================================================
// Fixtures
// =============================================================================

/// Catalog fixture shared by every test: two categories, three products.
///
/// `wool-fedora` has stock 5 (the clamp scenarios), `tweed-flat-cap` has
/// stock 0 (the out-of-stock rendering).
fn fixture_products() -> Vec<ProductDetail> {
    let fedoras = category("Fedoras", "fedoras", "Classic brimmed hats", 2);
    let caps = category("Flat Caps", "flat-caps", "Casual wool caps", 1);

    vec![
        product(&fedoras, "Wool Fedora", "wool-fedora", 4900, 5),
        product(&fedoras, "Straw Boater", "straw-boater", 3550, 12),
        product(&caps, "Tweed Flat Cap", "tweed-flat-cap", 4225, 0),
    ]
}

fn category(name: &str, slug: &str, description: &str, product_count: u32) -> Category {
    Category {
        id: CategoryId::random(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: description.to_string(),
        product_count,
        created_at: Utc::now(),
    }
}

fn product(
    category: &Category,
    name: &str,
    slug: &str,
    price_cents: i64,
    stock: u32,
) -> ProductDetail {
    let image = ProductImage {
        id: ProductImageId::random(),
        image_url: format!("https://img.haberdash.test/{slug}.jpg"),
        display_order: 0,
        is_primary: true,
    };
    ProductDetail {
        id: ProductId::random(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: format!("{name}, made to last."),
        price: Price::from_cents(price_cents),
        category: category.clone(),
        stock,
        is_active: true,
        in_stock: stock > 0,
        images: vec![image],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn listing_shape(detail: &ProductDetail) -> Product {
    Product {
        id: detail.id,
        name: detail.name.clone(),
        slug: detail.slug.clone(),
        description: detail.description.clone(),
        price: detail.price,
        category: detail.category.clone(),
        stock: detail.stock,
        is_active: detail.is_active,
        in_stock: detail.in_stock,
        primary_image: detail.images.iter().find(|i| i.is_primary).cloned(),
        created_at: detail.created_at,
    }
}

// =============================================================================
// Stub Backend
// =============================================================================

struct BackendState {
    products: Vec<ProductDetail>,
    cart: Mutex<Vec<CartItem>>,
    orders: Mutex<Vec<Order>>,
}

type Backend = Arc<BackendState>;

/// Backend cart payload: totals are computed server-side, exactly like the
/// real service, so every response upholds the cart invariants.
fn cart_payload(items: &[CartItem]) -> Cart {
    Cart {
        total_items: items.iter().map(|i| i.quantity).sum(),
        subtotal: items.iter().map(|i| i.price.line_total(i.quantity)).sum(),
        items: items.to_vec(),
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn list_categories(State(backend): State<Backend>) -> Json<Page<Category>> {
    let mut categories: Vec<Category> = Vec::new();
    for product in &backend.products {
        if !categories.iter().any(|c| c.slug == product.category.slug) {
            categories.push(product.category.clone());
        }
    }
    Json(Page {
        count: categories.len() as u64,
        next: None,
        previous: None,
        results: categories,
    })
}

async fn get_category(State(backend): State<Backend>, Path(slug): Path<String>) -> Response {
    backend
        .products
        .iter()
        .map(|p| &p.category)
        .find(|c| c.slug == slug)
        .map_or_else(
            || error_body(StatusCode::NOT_FOUND, "Category not found"),
            |category| Json(category.clone()).into_response(),
        )
}

#[derive(Debug, Deserialize)]
struct ProductsQuery {
    category: Option<String>,
    #[allow(dead_code)]
    page: Option<u32>,
}

async fn list_products(
    State(backend): State<Backend>,
    Query(query): Query<ProductsQuery>,
) -> Json<Page<Product>> {
    let results: Vec<Product> = backend
        .products
        .iter()
        .filter(|p| {
            query
                .category
                .as_ref()
                .is_none_or(|slug| &p.category.slug == slug)
        })
        .map(listing_shape)
        .collect();
    Json(Page {
        count: results.len() as u64,
        next: None,
        previous: None,
        results,
    })
}

async fn get_product(State(backend): State<Backend>, Path(slug): Path<String>) -> Response {
    backend.products.iter().find(|p| p.slug == slug).map_or_else(
        || error_body(StatusCode::NOT_FOUND, "Product not found"),
        |product| Json(product.clone()).into_response(),
    )
}

async fn get_cart(State(backend): State<Backend>) -> Json<Cart> {
    let items = backend.cart.lock().await;
    Json(cart_payload(&items))
}

async fn clear_cart(State(backend): State<Backend>) -> Json<Cart> {
    let mut items = backend.cart.lock().await;
    items.clear();
    Json(cart_payload(&items))
}

async fn add_cart_item(
    State(backend): State<Backend>,
    Json(request): Json<AddItemRequest>,
) -> Response {
    if request.quantity < 1 {
        return error_body(
            StatusCode::BAD_REQUEST,
            "quantity must be a positive integer",
        );
    }

    let Some(product) = backend.products.iter().find(|p| p.id == request.product_id) else {
        return error_body(StatusCode::NOT_FOUND, "Product not found");
    };

    let mut items = backend.cart.lock().await;
    let item = if let Some(existing) = items.iter_mut().find(|i| i.product_id == request.product_id)
    {
        existing.quantity += request.quantity;
        existing.clone()
    } else {
        let item = CartItem {
            product_id: product.id,
            quantity: request.quantity,
            name: product.name.clone(),
            price: product.price,
            image_url: product
                .images
                .iter()
                .find(|i| i.is_primary)
                .map(|i| i.image_url.clone()),
        };
        items.push(item.clone());
        item
    };

    (
        StatusCode::CREATED,
        Json(CartMutation {
            item: Some(item),
            cart: cart_payload(&items),
        }),
    )
        .into_response()
}

/// The real backend accepts any integer here: non-positive removes the line.
#[derive(Debug, Deserialize)]
struct UpdateBody {
    quantity: i64,
}

async fn update_cart_item(
    State(backend): State<Backend>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut items = backend.cart.lock().await;
    let position = items.iter().position(|i| i.product_id == product_id);

    if body.quantity <= 0 {
        let removed = position.map(|p| items.remove(p));
        return Json(CartMutation {
            item: removed,
            cart: cart_payload(&items),
        })
        .into_response();
    }

    let Some(position) = position else {
        return error_body(StatusCode::NOT_FOUND, "Item not found in cart");
    };

    let item = match items.get_mut(position) {
        Some(item) => {
            item.quantity = u32::try_from(body.quantity).unwrap_or(u32::MAX);
            item.clone()
        }
        None => return error_body(StatusCode::NOT_FOUND, "Item not found in cart"),
    };

    Json(CartMutation {
        item: Some(item),
        cart: cart_payload(&items),
    })
    .into_response()
}

async fn remove_cart_item(
    State(backend): State<Backend>,
    Path(product_id): Path<ProductId>,
) -> Response {
    let mut items = backend.cart.lock().await;
    let Some(position) = items.iter().position(|i| i.product_id == product_id) else {
        return error_body(StatusCode::NOT_FOUND, "Item not found in cart");
    };

    let removed = items.remove(position);
    Json(CartRemoval {
        removed,
        cart: cart_payload(&items),
    })
    .into_response()
}

async fn checkout(
    State(backend): State<Backend>,
    Json(request): Json<CheckoutRequest>,
) -> Response {
    let mut items = backend.cart.lock().await;
    if items.is_empty() {
        return error_body(
            StatusCode::BAD_REQUEST,
            "Cannot create order from empty cart",
        );
    }

    let order_items: Vec<OrderItem> = items
        .iter()
        .map(|item| OrderItem {
            id: OrderItemId::random(),
            product_name: item.name.clone(),
            quantity: item.quantity,
            price_at_purchase: item.price,
            subtotal: item.price.line_total(item.quantity),
        })
        .collect();

    let order = Order {
        id: OrderId::random(),
        email: request.email,
        status: OrderStatus::Pending,
        total_price: order_items.iter().map(|i| i.subtotal).sum(),
        item_count: order_items.iter().map(|i| i.quantity).sum(),
        items: order_items,
        shipping_address: ShippingAddress {
            id: AddressId::random(),
            name: request.name,
            address_line_1: request.address_line_1,
            address_line_2: request.address_line_2.unwrap_or_default(),
            city: request.city,
            state: request.state,
            postal_code: request.postal_code,
            country: request
                .country
                .unwrap_or_else(|| "United States".to_string()),
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    // Checkout clears the cart server-side
    items.clear();

    let mut orders = backend.orders.lock().await;
    orders.push(order.clone());

    (StatusCode::CREATED, Json(order)).into_response()
}

async fn get_order(State(backend): State<Backend>, Path(order_id): Path<OrderId>) -> Response {
    let orders = backend.orders.lock().await;
    orders.iter().find(|o| o.id == order_id).map_or_else(
        || error_body(StatusCode::NOT_FOUND, "Order not found"),
        |order| Json(order.clone()).into_response(),
    )
}

async fn list_orders(State(backend): State<Backend>) -> Json<Page<OrderSummary>> {
    let orders = backend.orders.lock().await;
    let results: Vec<OrderSummary> = orders
        .iter()
        .map(|o| OrderSummary {
            id: o.id,
            email: o.email.clone(),
            status: o.status,
            total_price: o.total_price,
            item_count: o.item_count,
            created_at: o.created_at,
        })
        .collect();
    Json(Page {
        count: results.len() as u64,
        next: None,
        previous: None,
        results,
    })
}

/// Build the stub backend router with the standard fixtures.
fn backend_router() -> Router {
    let state: Backend = Arc::new(BackendState {
        products: fixture_products(),
        cart: Mutex::new(Vec::new()),
        orders: Mutex::new(Vec::new()),
    });

    Router::new()
        .route("/api/categories/", get(list_categories))
        .route("/api/categories/{slug}/", get(get_category))
        .route("/api/products/", get(list_products))
        .route("/api/products/{slug}/", get(get_product))
        .route("/api/cart/", get(get_cart).delete(clear_cart))
        .route("/api/cart/items/", axum::routing::post(add_cart_item))
        .route(
            "/api/cart/items/{product_id}/",
            axum::routing::patch(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/orders/checkout/", axum::routing::post(checkout))
        .route("/api/orders/", get(list_orders))
        .route("/api/orders/{order_id}/", get(get_order))
        .with_state(state)
}

// =============================================================================
// Test Context
// =============================================================================

/// A storefront and its stub backend, both live on ephemeral ports.
pub struct TestContext {
    /// Base URL of the running storefront.
    pub storefront_url: String,
    /// Base URL of the stub backend (for fixture lookups).
    pub backend_url: String,
    /// HTTP client with cookies enabled and redirects disabled, so tests
    /// can assert on redirect responses.
    pub client: reqwest::Client,
    /// The storefront's application state; shared with the running server.
    pub state: AppState,
}

impl TestContext {
    /// Spawn the stub backend and the storefront.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to bind or the client cannot be built.
    pub async fn spawn() -> Self {
        let backend_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let backend_addr = backend_listener
            .local_addr()
            .expect("Failed to read backend address");
        tokio::spawn(async move {
            axum::serve(backend_listener, backend_router())
                .await
                .expect("Stub backend server error");
        });
        let backend_url = format!("http://{backend_addr}");

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost:0".to_string(),
            shop_api: ShopApiConfig {
                base_url: url::Url::parse(&backend_url).expect("valid backend URL"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("Failed to build application state");
        state.cart().refresh().await;

        let storefront_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let storefront_addr = storefront_listener
            .local_addr()
            .expect("Failed to read storefront address");
        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .merge(routes::routes())
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(storefront_listener, app)
                .await
                .expect("Storefront server error");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            storefront_url: format!("http://{storefront_addr}"),
            backend_url,
            client,
            state,
        }
    }

    /// GET a storefront path and return the response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails at the transport level.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.storefront_url))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a form to a storefront path and return the response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails at the transport level.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.storefront_url))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Look up a fixture product by slug straight from the stub backend.
    ///
    /// # Panics
    ///
    /// Panics if the product does not exist in the fixtures.
    pub async fn backend_product(&self, slug: &str) -> ProductDetail {
        self.client
            .get(format!("{}/api/products/{slug}/", self.backend_url))
            .send()
            .await
            .expect("backend product request failed")
            .json()
            .await
            .expect("backend product should deserialize")
    }
}
