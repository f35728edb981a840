//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Home page (category grid)
//!
//! # Catalog
//! GET  /category/{slug}     - Product listing ("all" = unfiltered)
//! GET  /product/{slug}      - Product detail with quantity selector
//!
//! # Cart (HTMX fragments)
//! GET  /cart                - Cart page
//! POST /cart/add            - Add to cart (returns cart count fragment)
//! POST /cart/adjust         - Apply a +/-1 delta to a line
//! POST /cart/update         - Set absolute quantity (returns cart_items fragment)
//! POST /cart/remove         - Remove line (returns cart_items fragment)
//! POST /cart/clear          - Empty the cart (returns cart_items fragment)
//! GET  /cart/count          - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout            - Checkout form
//! POST /checkout            - Validate and place the order
//!
//! # Orders
//! GET  /order/{order_id}    - Order confirmation (read-only snapshot)
//! GET  /orders              - Order history
//! ```

pub mod cart;
pub mod category;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod product;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    routing::{get, post},
};

use crate::filters;
use crate::state::AppState;

/// Shared "not found" page used by category, product, and order views.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub title: String,
    pub message: String,
    pub action_href: String,
    pub action_label: String,
}

impl NotFoundTemplate {
    /// Not-found state with a path back to the home view.
    #[must_use]
    pub fn back_home(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            action_href: "/".to_string(),
            action_label: "Back to Home".to_string(),
        }
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/adjust", post(cart::adjust))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/category/{slug}", get(category::show))
        .route("/product/{slug}", get(product::show))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::submit))
        // Orders
        .route("/order/{order_id}", get(orders::confirmation))
        .route("/orders", get(orders::index))
}
