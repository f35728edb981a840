//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads;
//! plain form posts fall back to a redirect to `/cart`. All mutations go
//! through the [`CartStore`](crate::services::CartStore), never straight to
//! the API client.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use haberdash_core::ProductId;

use crate::api::types::{Cart, CartItem};
use crate::filters;
use crate::services::CartSnapshot;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_price: item.price.line_total(item.quantity).display(),
            image_url: item.image_url.clone(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal.display(),
            item_count: cart.total_items,
        }
    }
}

// =============================================================================
// Quantity Adjustment Policy
// =============================================================================

/// What a +/-1 delta on an existing line resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line is removed; a quantity below 1 is never sent to the backend.
    Remove,
    /// The line is set to this absolute quantity.
    Update(u32),
}

/// Resolve a delta against the current quantity.
///
/// `current + delta < 1` removes the line rather than updating it with a
/// non-positive quantity.
#[must_use]
pub fn apply_delta(current: u32, delta: i32) -> QuantityChange {
    let next = i64::from(current) + i64::from(delta);
    if next < 1 {
        QuantityChange::Remove
    } else {
        QuantityChange::Update(u32::try_from(next).unwrap_or(u32::MAX))
    }
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data (product page).
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Slug to send the non-HTMX fallback back to (resets the selector to 1).
    pub slug: Option<String>,
}

/// Quantity delta form data (cart page +/- controls).
#[derive(Debug, Deserialize)]
pub struct AdjustCartForm {
    pub product_id: ProductId,
    pub delta: i32,
}

/// Absolute quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub loading: bool,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

fn items_fragment(snapshot: &CartSnapshot) -> CartItemsTemplate {
    CartItemsTemplate {
        cart: CartView::from(&snapshot.cart_or_empty()),
        error: snapshot.error.clone(),
    }
}

/// Fragment response for a settled mutation, with the cart-updated trigger
/// so the header badge refreshes itself.
async fn mutation_response(state: &AppState, headers: &HeaderMap) -> Response {
    if is_htmx(headers) {
        let snapshot = state.cart().snapshot().await;
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            items_fragment(&snapshot),
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cart().snapshot().await;
    CartShowTemplate {
        cart: CartView::from(&snapshot.cart_or_empty()),
        loading: snapshot.loading,
        error: snapshot.error,
    }
}

/// Add item to cart.
///
/// HTMX requests get the cart count fragment plus a `cart-updated` trigger;
/// plain form posts bounce back to the product page, which resets the
/// quantity selector to 1.
#[instrument(skip(state, headers))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1);

    match state.cart().add_item(form.product_id, quantity).await {
        Ok(()) => {
            if is_htmx(&headers) {
                let snapshot = state.cart().snapshot().await;
                let count = snapshot.cart_or_empty().total_items;
                (
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate { count },
                )
                    .into_response()
            } else {
                let target = form
                    .slug
                    .map_or_else(|| "/cart".to_string(), |slug| format!("/product/{slug}"));
                Redirect::to(&target).into_response()
            }
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"error-text\">Error adding to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Apply a +/-1 delta to an existing line (cart page controls).
///
/// A result below 1 removes the line instead of updating it.
#[instrument(skip(state, headers))]
pub async fn adjust(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AdjustCartForm>,
) -> Response {
    let snapshot = state.cart().snapshot().await;
    let cart = snapshot.cart_or_empty();
    let Some(current) = cart.item(form.product_id).map(|item| item.quantity) else {
        // Line vanished under us (e.g. cleared in another tab); just re-render.
        return mutation_response(&state, &headers).await;
    };

    let result = match apply_delta(current, form.delta) {
        QuantityChange::Remove => state.cart().remove_item(form.product_id).await,
        QuantityChange::Update(quantity) => {
            state.cart().update_item(form.product_id, quantity).await
        }
    };

    if let Err(e) = result {
        tracing::error!("Failed to adjust cart line: {e}");
    }

    mutation_response(&state, &headers).await
}

/// Set the absolute quantity of a line.
#[instrument(skip(state, headers))]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    if let Err(e) = state
        .cart()
        .update_item(form.product_id, form.quantity)
        .await
    {
        tracing::error!("Failed to update cart: {e}");
    }

    mutation_response(&state, &headers).await
}

/// Remove a line from the cart.
#[instrument(skip(state, headers))]
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    if let Err(e) = state.cart().remove_item(form.product_id).await {
        tracing::error!("Failed to remove from cart: {e}");
    }

    mutation_response(&state, &headers).await
}

/// Empty the cart.
#[instrument(skip(state, headers))]
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = state.cart().clear().await {
        tracing::error!("Failed to clear cart: {e}");
    }

    mutation_response(&state, &headers).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cart().snapshot().await;
    CartCountTemplate {
        count: snapshot.cart_or_empty().total_items,
    }
}
