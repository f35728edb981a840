//! Domain types for the shop backend REST API.
//!
//! These are the typed counterparts of the backend's JSON shapes. Required
//! versus optional is explicit: anything the backend may omit or null is an
//! `Option`, and deserialization at the client boundary rejects responses
//! that do not match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use haberdash_core::{
    AddressId, CategoryId, OrderId, OrderItemId, OrderStatus, Price, ProductId, ProductImageId,
};

// =============================================================================
// Pagination
// =============================================================================

/// The backend's pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of results across all pages.
    pub count: u64,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    /// Results for this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// An empty page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image_url: String,
    pub display_order: u32,
    pub is_primary: bool,
}

/// A product as it appears in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    pub stock: u32,
    pub is_active: bool,
    pub in_stock: bool,
    /// The primary image, absent when the product has no images.
    pub primary_image: Option<ProductImage>,
    pub created_at: DateTime<Utc>,
}

/// Full product detail, including the complete image list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    pub stock: u32,
    pub is_active: bool,
    pub in_stock: bool,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line of the cart: a product and its selected quantity.
///
/// Quantity is always at least 1; a line reduced to zero is removed by the
/// backend rather than retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
}

/// The session cart. Line order is insertion order; product ids are unique.
///
/// `total_items` and `subtotal` are computed by the backend and treated as
/// authoritative here - the storefront never recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub subtotal: Price,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            subtotal: Price::ZERO,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product, if present.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

/// Response envelope for add/update cart mutations.
///
/// `item` is the affected line; it is absent when an update removed the line
/// (quantity driven to zero server-side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMutation {
    pub item: Option<CartItem>,
    pub cart: Cart,
}

/// Response envelope for a line removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRemoval {
    pub removed: CartItem,
    pub cart: Cart,
}

/// Request body for adding a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request body for setting a line's absolute quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Order Types
// =============================================================================

/// Shipping address snapshot attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: AddressId,
    pub name: String,
    pub address_line_1: String,
    /// Second address line; the backend stores an empty string when unset.
    #[serde(default)]
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A line of an order, snapshotted at checkout and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Price,
    pub subtotal: Price,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub email: String,
    pub status: OrderStatus,
    pub total_price: Price,
    pub item_count: u32,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order shape returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub email: String,
    pub status: OrderStatus,
    pub total_price: Price,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Request body for checkout.
///
/// `address_line_2` and `country` are the only optional fields; the backend
/// defaults the country to "United States".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub name: String,
    pub address_line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_deserializes_from_backend_shape() {
        let json = r#"{
            "items": [
                {
                    "product_id": "8f2b9cbe-3a64-4b2e-9a53-7f2d3c1e0a11",
                    "quantity": 2,
                    "name": "Wool Fedora",
                    "price": "49.00",
                    "image_url": null
                }
            ],
            "total_items": 2,
            "subtotal": "98.00"
        }"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.subtotal, Price::from_cents(9800));
        let item = cart.items.first().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.image_url, None);
        assert!(cart.item(item.product_id).is_some());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.subtotal, Price::ZERO);
    }

    #[test]
    fn test_cart_mutation_item_may_be_absent() {
        let json = r#"{"item": null, "cart": {"items": [], "total_items": 0, "subtotal": "0.00"}}"#;
        let mutation: CartMutation = serde_json::from_str(json).unwrap();
        assert!(mutation.item.is_none());
        assert!(mutation.cart.is_empty());
    }

    #[test]
    fn test_page_envelope() {
        let json = r#"{"count": 0, "next": null, "previous": null, "results": []}"#;
        let page: Page<Category> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_checkout_request_omits_unset_optionals() {
        let request = CheckoutRequest {
            email: "user@example.com".to_string(),
            name: "Jo Brim".to_string(),
            address_line_1: "123 Main St".to_string(),
            address_line_2: None,
            city: "New York".to_string(),
            state: "NY".to_string(),
            postal_code: "10001".to_string(),
            country: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("address_line_2").is_none());
        assert!(json.get("country").is_none());
    }

    #[test]
    fn test_order_status_on_order() {
        let json = r#"{
            "id": "0a2b9cbe-3a64-4b2e-9a53-7f2d3c1e0a11",
            "email": "user@example.com",
            "status": "pending",
            "total_price": "98.00",
            "item_count": 2,
            "items": [],
            "shipping_address": {
                "id": "1a2b9cbe-3a64-4b2e-9a53-7f2d3c1e0a11",
                "name": "Jo Brim",
                "address_line_1": "123 Main St",
                "city": "New York",
                "state": "NY",
                "postal_code": "10001",
                "country": "United States"
            },
            "created_at": "2025-06-01T12:00:00Z",
            "updated_at": "2025-06-01T12:00:00Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping_address.address_line_2, "");
    }
}
