//! Integration tests for checkout: validation, order creation, and the
//! confirmation view.

use reqwest::StatusCode;

use haberdash_integration_tests::TestContext;

const VALID_FORM: &[(&str, &str)] = &[
    ("email", "jo@example.com"),
    ("name", "Jo Brim"),
    ("address_line_1", "123 Main St"),
    ("address_line_2", ""),
    ("city", "New York"),
    ("state", "NY"),
    ("postal_code", "10001"),
    ("country", "United States"),
];

async fn add_fixture_items(ctx: &TestContext) {
    let fedora = ctx.backend_product("wool-fedora").await;
    let boater = ctx.backend_product("straw-boater").await;
    ctx.post_form(
        "/cart/add",
        &[
            ("product_id", fedora.id.to_string().as_str()),
            ("quantity", "2"),
        ],
    )
    .await;
    ctx.post_form(
        "/cart/add",
        &[
            ("product_id", boater.id.to_string().as_str()),
            ("quantity", "1"),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_checkout_with_empty_cart_shows_browse_action() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"empty-cart\""));
    assert!(body.contains("Browse Products"));
    assert!(!body.contains("data-testid=\"place-order\""));
}

#[tokio::test]
async fn test_empty_form_produces_all_required_field_errors_at_once() {
    let ctx = TestContext::spawn().await;
    add_fixture_items(&ctx).await;

    let resp = ctx.post_form("/checkout", &[]).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"error-email\""));
    assert!(body.contains("data-testid=\"error-name\""));
    assert!(body.contains("data-testid=\"error-address_line_1\""));
    assert!(body.contains("data-testid=\"error-city\""));
    assert!(body.contains("data-testid=\"error-state\""));
    assert!(body.contains("data-testid=\"error-postal_code\""));
}

#[tokio::test]
async fn test_invalid_email_is_the_only_error() {
    let ctx = TestContext::spawn().await;
    add_fixture_items(&ctx).await;

    let mut form: Vec<(&str, &str)> = VALID_FORM.to_vec();
    if let Some(email) = form.iter_mut().find(|(key, _)| *key == "email") {
        email.1 = "not-an-email";
    }

    let resp = ctx.post_form("/checkout", &form).await;
    let body = resp.text().await.expect("Failed to read response");

    assert!(body.contains("data-testid=\"error-email\""));
    assert!(body.contains("Please enter a valid email"));
    assert!(!body.contains("data-testid=\"error-name\""));
    assert!(!body.contains("data-testid=\"error-address_line_1\""));
    assert!(!body.contains("data-testid=\"error-city\""));
    assert!(!body.contains("data-testid=\"error-state\""));
    assert!(!body.contains("data-testid=\"error-postal_code\""));

    // Entered values are preserved for editing
    assert!(body.contains("value=\"Jo Brim\""));
}

#[tokio::test]
async fn test_valid_checkout_redirects_to_matching_confirmation() {
    let ctx = TestContext::spawn().await;
    add_fixture_items(&ctx).await;

    // Capture the cart as it stood before submission
    let snapshot = ctx.state.cart().snapshot().await;
    let cart_before = snapshot.cart.expect("cart should be loaded");
    assert!(!cart_before.is_empty());

    let resp = ctx.post_form("/checkout", VALID_FORM).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("redirect should carry a location")
        .to_string();
    assert!(location.starts_with("/order/"));

    // The confirmation renders the same item count and total as the cart
    let body = ctx
        .get(&location)
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"order-confirmation\""));
    assert!(body.contains(&format!(
        "data-testid=\"order-item-count\">{}<",
        cart_before.total_items
    )));
    assert!(body.contains(&format!(
        "data-testid=\"order-total\">{}<",
        cart_before.subtotal.display()
    )));
    assert!(body.contains("Pending"));
    assert!(body.contains("jo@example.com"));

    // The backend cleared the cart at order creation and the store refreshed
    let snapshot = ctx.state.cart().snapshot().await;
    assert!(snapshot.cart.expect("cart should be loaded").is_empty());

    let cart_page = ctx
        .get("/cart")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(cart_page.contains("data-testid=\"empty-cart\""));
}

#[tokio::test]
async fn test_nonexistent_order_renders_not_found() {
    let ctx = TestContext::spawn().await;

    let resp = ctx
        .get("/order/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"not-found\""));
    assert!(body.contains("Back to Home"));
}

#[tokio::test]
async fn test_malformed_order_id_renders_not_found() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/order/not-a-uuid").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"not-found\""));
}

#[tokio::test]
async fn test_order_history_lists_placed_orders() {
    let ctx = TestContext::spawn().await;

    // Before any orders
    let body = ctx
        .get("/orders")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"no-orders\""));

    add_fixture_items(&ctx).await;
    let resp = ctx.post_form("/checkout", VALID_FORM).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = ctx
        .get("/orders")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"orders-list\""));
    assert!(body.contains("Pending"));
}
