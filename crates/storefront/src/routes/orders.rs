//! Order confirmation and history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use haberdash_core::OrderId;

use crate::api::types::{Order, OrderItem, OrderSummary, ShippingAddress};
use crate::filters;
use crate::state::AppState;

use super::NotFoundTemplate;
use super::category::PaginationQuery;

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub product_name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price_at_purchase.display(),
            line_total: item.subtotal.display(),
        }
    }
}

/// Shipping address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&ShippingAddress> for AddressView {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            name: address.name.clone(),
            address_line_1: address.address_line_1.clone(),
            address_line_2: address.address_line_2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// Order display data for the confirmation view.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    pub email: String,
    pub status: String,
    pub total_price: String,
    pub item_count: u32,
    pub items: Vec<OrderItemView>,
    pub shipping_address: AddressView,
    pub placed_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let id = order.id.to_string();
        let short_id = id.chars().take(8).collect();
        Self {
            id,
            short_id,
            email: order.email.clone(),
            status: order.status.label().to_string(),
            total_price: order.total_price.display(),
            item_count: order.item_count,
            items: order.items.iter().map(OrderItemView::from).collect(),
            shipping_address: AddressView::from(&order.shipping_address),
            placed_at: order.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Order summary display data for the history list.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub id: String,
    pub short_id: String,
    pub status: String,
    pub total_price: String,
    pub item_count: u32,
    pub placed_at: String,
}

impl From<&OrderSummary> for OrderSummaryView {
    fn from(order: &OrderSummary) -> Self {
        let id = order.id.to_string();
        let short_id = id.chars().take(8).collect();
        Self {
            id,
            short_id,
            status: order.status.label().to_string(),
            total_price: order.total_price.display(),
            item_count: order.item_count,
            placed_at: order.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order: OrderView,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderSummaryView>,
    pub current_page: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub load_failed: bool,
}

/// Display the order confirmation view.
///
/// The order is fetched once on entry and rendered as a static snapshot; no
/// polling. A missing order, a malformed identifier, and a fetch error all
/// render the same not-found state with a path back home.
#[instrument(skip(state))]
pub async fn confirmation(State(state): State<AppState>, Path(order_id): Path<String>) -> Response {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            NotFoundTemplate::back_home(
                "Order Not Found",
                "We couldn't find that order. It may have been placed in another session.",
            ),
        )
            .into_response()
    };

    let Ok(order_id) = order_id.parse::<OrderId>() else {
        return not_found();
    };

    match state.api().get_order(order_id).await {
        Ok(order) => OrderConfirmationTemplate {
            order: OrderView::from(&order),
        }
        .into_response(),
        Err(e) => {
            if !e.is_not_found() {
                tracing::error!("Failed to fetch order {order_id}: {e}");
            }
            not_found()
        }
    }
}

/// Display the order history list.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> impl IntoResponse {
    let current_page = query.page.unwrap_or(1);

    match state.api().list_orders(Some(current_page)).await {
        Ok(page) => OrdersIndexTemplate {
            orders: page.results.iter().map(OrderSummaryView::from).collect(),
            current_page,
            has_previous: page.previous.is_some(),
            has_next: page.next.is_some(),
            load_failed: false,
        },
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            OrdersIndexTemplate {
                orders: Vec::new(),
                current_page,
                has_previous: false,
                has_next: false,
                load_failed: true,
            }
        }
    }
}
