//! Product detail route handler.
//!
//! The quantity selector is plain page state: the +/- controls are links
//! that reload the page with a clamped `qty` parameter, and add-to-cart
//! submits the selected quantity as a single cart mutation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ApiError;
use crate::api::types::ProductDetail;
use crate::filters;
use crate::state::AppState;

use super::NotFoundTemplate;

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub is_primary: bool,
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
    pub category_name: String,
    pub category_slug: String,
    pub images: Vec<ImageView>,
}

impl From<&ProductDetail> for ProductView {
    fn from(product: &ProductDetail) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            stock: product.stock,
            in_stock: product.in_stock,
            category_name: product.category.name.clone(),
            category_slug: product.category.slug.clone(),
            images: product
                .images
                .iter()
                .map(|img| ImageView {
                    url: img.image_url.clone(),
                    is_primary: img.is_primary,
                })
                .collect(),
        }
    }
}

/// Quantity selector query parameter.
#[derive(Debug, Deserialize)]
pub struct SelectorQuery {
    pub qty: Option<u32>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    /// Currently selected quantity, already clamped into `[1, stock]`.
    pub quantity: u32,
    pub decrement_qty: u32,
    pub increment_qty: u32,
}

/// Clamp `current + delta` into `[1, stock]` inclusive.
///
/// The floor always applies; the ceiling uses a stock of at least 1 so the
/// range stays well-formed even for an out-of-stock product (the add-to-cart
/// control is hidden in that case anyway).
#[must_use]
pub fn clamp_quantity(current: u32, delta: i32, stock: u32) -> u32 {
    let next = i64::from(current) + i64::from(delta);
    let ceiling = i64::from(stock.max(1));
    u32::try_from(next.clamp(1, ceiling)).unwrap_or(1)
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<SelectorQuery>,
) -> Response {
    let product = match state.api().get_product(&slug).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                NotFoundTemplate::back_home(
                    "Product Not Found",
                    "The product you're looking for doesn't exist or has been removed.",
                ),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch product {slug}: {e}");
            return (
                StatusCode::NOT_FOUND,
                NotFoundTemplate::back_home(
                    "Product Not Found",
                    "The product you're looking for doesn't exist or has been removed.",
                ),
            )
                .into_response();
        }
    };

    // Clamp whatever arrived in the URL, then derive the +/- targets from it.
    let quantity = clamp_quantity(query.qty.unwrap_or(1), 0, product.stock);
    let decrement_qty = clamp_quantity(quantity, -1, product.stock);
    let increment_qty = clamp_quantity(quantity, 1, product.stock);

    ProductShowTemplate {
        product: ProductView::from(&product),
        quantity,
        decrement_qty,
        increment_qty,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_floor() {
        // Decrementing from 1 stays at 1.
        assert_eq!(clamp_quantity(1, -1, 5), 1);
    }

    #[test]
    fn test_clamp_ceiling() {
        // Incrementing from stock stays at stock.
        assert_eq!(clamp_quantity(5, 1, 5), 5);
    }

    #[test]
    fn test_clamp_interior_moves() {
        assert_eq!(clamp_quantity(2, 1, 5), 3);
        assert_eq!(clamp_quantity(2, -1, 5), 1);
    }

    #[test]
    fn test_clamp_out_of_range_input() {
        // A hand-edited URL can carry anything; it still lands in range.
        assert_eq!(clamp_quantity(99, 0, 5), 5);
        assert_eq!(clamp_quantity(0, 0, 5), 1);
    }

    #[test]
    fn test_clamp_zero_stock_keeps_range_well_formed() {
        assert_eq!(clamp_quantity(3, 1, 0), 1);
    }
}
