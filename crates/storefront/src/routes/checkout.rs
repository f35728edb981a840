//! Checkout route handlers.
//!
//! Validation is a pure, synchronous pass over the submitted fields, run on
//! submit only - every rule is evaluated so each invalid field gets its own
//! message in one round trip. Field errors clear on the next submission of
//! a corrected value; the form never validates per keystroke.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use haberdash_core::Email;

use crate::api::types::CheckoutRequest;
use crate::filters;
use crate::state::AppState;

use super::cart::CartView;

/// Default country preset in the form.
const DEFAULT_COUNTRY: &str = "United States";

/// Submitted checkout form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl CheckoutForm {
    /// Fresh form as rendered on page entry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            ..Self::default()
        }
    }

    fn into_request(self) -> CheckoutRequest {
        CheckoutRequest {
            email: self.email,
            name: self.name,
            address_line_1: self.address_line_1,
            address_line_2: if self.address_line_2.is_empty() {
                None
            } else {
                Some(self.address_line_2)
            },
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: if self.country.is_empty() {
                None
            } else {
                Some(self.country)
            },
        }
    }
}

/// Validate the form. Returns one message per invalid field, keyed by field
/// name; the form is valid iff the map is empty.
///
/// Rules (all evaluated, none short-circuited):
/// - `email`: required, and must look like `local@domain.tld`
/// - `name`, `address_line_1`, `city`, `state`, `postal_code`: required
///   (no trimming - an empty string fails, whitespace passes)
/// - `address_line_2`, `country`: never required
#[must_use]
pub fn validate(form: &CheckoutForm) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if form.email.is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if Email::parse(&form.email).is_err() {
        errors.insert("email", "Please enter a valid email".to_string());
    }

    if form.name.is_empty() {
        errors.insert("name", "Name is required".to_string());
    }

    if form.address_line_1.is_empty() {
        errors.insert("address_line_1", "Address is required".to_string());
    }

    if form.city.is_empty() {
        errors.insert("city", "City is required".to_string());
    }

    if form.state.is_empty() {
        errors.insert("state", "State is required".to_string());
    }

    if form.postal_code.is_empty() {
        errors.insert("postal_code", "Postal code is required".to_string());
    }

    errors
}

// =============================================================================
// Templates
// =============================================================================

/// A form field's current value and its validation error, if any.
#[derive(Clone, Default)]
pub struct FieldView {
    pub value: String,
    pub error: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub cart_is_empty: bool,
    pub loading: bool,
    pub email: FieldView,
    pub name: FieldView,
    pub address_line_1: FieldView,
    pub address_line_2: FieldView,
    pub city: FieldView,
    pub state: FieldView,
    pub postal_code: FieldView,
    pub country: FieldView,
    pub submit_error: Option<String>,
}

impl CheckoutTemplate {
    fn build(
        cart: CartView,
        loading: bool,
        form: &CheckoutForm,
        mut errors: BTreeMap<&'static str, String>,
        submit_error: Option<String>,
    ) -> Self {
        let field = |value: &str, error: Option<String>| FieldView {
            value: value.to_string(),
            error,
        };

        Self {
            cart_is_empty: cart.items.is_empty(),
            cart,
            loading,
            email: field(&form.email, errors.remove("email")),
            name: field(&form.name, errors.remove("name")),
            address_line_1: field(&form.address_line_1, errors.remove("address_line_1")),
            address_line_2: field(&form.address_line_2, None),
            city: field(&form.city, errors.remove("city")),
            state: field(&form.state, errors.remove("state")),
            postal_code: field(&form.postal_code, errors.remove("postal_code")),
            country: field(&form.country, None),
            submit_error,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout form.
///
/// An empty cart renders an empty state with a browse link; there is nothing
/// to submit.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cart().snapshot().await;
    CheckoutTemplate::build(
        CartView::from(&snapshot.cart_or_empty()),
        snapshot.loading,
        &CheckoutForm::empty(),
        BTreeMap::new(),
        None,
    )
}

/// Validate and submit the checkout form.
///
/// On success the cart is refreshed (the backend clears it at order
/// creation) and the caller is redirected to the order confirmation view.
/// On backend failure a single generic submission error is shown and the
/// form stays editable with the entered values.
#[instrument(skip(state, form))]
pub async fn submit(State(state): State<AppState>, Form(form): Form<CheckoutForm>) -> Response {
    let snapshot = state.cart().snapshot().await;
    let cart = CartView::from(&snapshot.cart_or_empty());

    let errors = validate(&form);
    if !errors.is_empty() {
        return CheckoutTemplate::build(cart, snapshot.loading, &form, errors, None)
            .into_response();
    }

    match state.api().checkout(&form.clone().into_request()).await {
        Ok(order) => {
            state.cart().refresh().await;
            Redirect::to(&format!("/order/{}", order.id)).into_response()
        }
        Err(e) => {
            tracing::error!("Checkout failed: {e}");
            CheckoutTemplate::build(
                cart,
                snapshot.loading,
                &form,
                BTreeMap::new(),
                Some("Failed to process order. Please try again.".to_string()),
            )
            .into_response()
        }
    }
}
