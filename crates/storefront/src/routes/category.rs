//! Category (product listing) route handlers.

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
use crate::api::types::Product;
use crate::filters;
use crate::state::AppState;

use super::NotFoundTemplate;

/// The pseudo-slug that lists every product, unfiltered.
pub const ALL_PRODUCTS_SLUG: &str = "all";

/// Product display data for listing grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub name: String,
    pub slug: String,
    pub price: String,
    pub in_stock: bool,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price.display(),
            in_stock: product.in_stock,
            image_url: product.primary_image.as_ref().map(|i| i.image_url.clone()),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category/show.html")]
pub struct CategoryShowTemplate {
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub products: Vec<ProductCardView>,
    pub current_page: u32,
    pub has_previous: bool,
    pub has_next: bool,
    /// Set when the product fetch failed; renders an inline error state
    /// with a retry link instead of the grid.
    pub load_failed: bool,
}

/// Display a category's products. The slug `all` lists everything.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Response {
    let current_page = query.page.unwrap_or(1);

    // "all" skips the category fetch entirely
    let (title, description, filter) = if slug == ALL_PRODUCTS_SLUG {
        ("All Products".to_string(), None, None)
    } else {
        match state.api().get_category(&slug).await {
            Ok(category) => {
                let description = if category.description.is_empty() {
                    None
                } else {
                    Some(category.description)
                };
                (category.name, description, Some(slug.clone()))
            }
            Err(ApiError::NotFound(_)) => {
                return (
                    StatusCode::NOT_FOUND,
                    NotFoundTemplate::back_home(
                        "Category Not Found",
                        "The category you're looking for doesn't exist.",
                    ),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("Failed to fetch category {slug}: {e}");
                return error_state(slug, current_page).into_response();
            }
        }
    };

    match state
        .api()
        .list_products(filter.as_deref(), Some(current_page))
        .await
    {
        Ok(page) => CategoryShowTemplate {
            title,
            description,
            slug,
            products: page.results.iter().map(ProductCardView::from).collect(),
            current_page,
            has_previous: page.previous.is_some(),
            has_next: page.next.is_some(),
            load_failed: false,
        }
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch products for {slug}: {e}");
            error_state(slug, current_page).into_response()
        }
    }
}

fn error_state(slug: String, current_page: u32) -> CategoryShowTemplate {
    CategoryShowTemplate {
        title: "Something went wrong".to_string(),
        description: None,
        slug,
        products: Vec::new(),
        current_page,
        has_previous: false,
        has_next: false,
        load_failed: true,
    }
}
