//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::types::Category;
use crate::filters;
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryCardView {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: u32,
}

impl From<&Category> for CategoryCardView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            product_count: category.product_count,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryCardView>,
    /// Set when the category fetch failed; the page renders an inline error
    /// state with a retry link instead of the grid.
    pub load_failed: bool,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    match state.api().list_categories().await {
        Ok(page) => HomeTemplate {
            categories: page.results.iter().map(CategoryCardView::from).collect(),
            load_failed: false,
        },
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            HomeTemplate {
                categories: Vec::new(),
                load_failed: true,
            }
        }
    }
}
