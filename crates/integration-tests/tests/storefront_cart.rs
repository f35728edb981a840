//! Integration tests for the cart: empty state, mutations, and the
//! quantity policies.

use reqwest::StatusCode;

use haberdash_core::Price;
use haberdash_integration_tests::TestContext;

#[tokio::test]
async fn test_empty_cart_shows_browse_action_and_no_checkout_link() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/cart").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"empty-cart\""));
    assert!(body.contains("Start Shopping"));
    assert!(!body.contains("data-testid=\"checkout-link\""));
}

#[tokio::test]
async fn test_add_to_cart_updates_cart_page() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("wool-fedora").await;
    let product_id = product.id.to_string();

    // Plain form post redirects back to the product page (selector resets)
    let resp = ctx
        .post_form(
            "/cart/add",
            &[
                ("product_id", product_id.as_str()),
                ("quantity", "2"),
                ("slug", "wool-fedora"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").map(|v| v.to_str().unwrap()),
        Some("/product/wool-fedora")
    );

    let body = ctx
        .get("/cart")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("Wool Fedora"));
    assert!(body.contains("data-testid=\"cart-item-count\">2<"));
    assert!(body.contains("data-testid=\"cart-subtotal\">$98.00<"));
    assert!(body.contains("data-testid=\"checkout-link\""));
}

#[tokio::test]
async fn test_htmx_adjust_returns_items_fragment() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("straw-boater").await;
    let product_id = product.id.to_string();

    ctx.post_form(
        "/cart/add",
        &[("product_id", product_id.as_str()), ("quantity", "1")],
    )
    .await;

    let resp = ctx
        .client
        .post(format!("{}/cart/adjust", ctx.storefront_url))
        .header("HX-Request", "true")
        .form(&[("product_id", product_id.as_str()), ("delta", "1")])
        .send()
        .await
        .expect("POST request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").map(|v| v.to_str().unwrap()),
        Some("cart-updated")
    );

    let body = resp.text().await.expect("Failed to read response");
    // Fragment, not a full page
    assert!(!body.contains("<html"));
    assert!(body.contains("data-testid=\"cart-item\""));
    assert!(body.contains("data-testid=\"cart-item-count\">2<"));
}

#[tokio::test]
async fn test_decrement_from_one_removes_the_line() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("wool-fedora").await;
    let product_id = product.id.to_string();

    ctx.post_form(
        "/cart/add",
        &[("product_id", product_id.as_str()), ("quantity", "1")],
    )
    .await;

    let resp = ctx
        .post_form(
            "/cart/adjust",
            &[("product_id", product_id.as_str()), ("delta", "-1")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // The line is gone entirely, never present with quantity 0
    let snapshot = ctx.state.cart().snapshot().await;
    let cart = snapshot.cart.expect("cart should be loaded");
    assert!(cart.is_empty());
    assert!(cart.item(product.id).is_none());
}

#[tokio::test]
async fn test_increment_updates_quantity() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("wool-fedora").await;
    let product_id = product.id.to_string();

    ctx.post_form(
        "/cart/add",
        &[("product_id", product_id.as_str()), ("quantity", "1")],
    )
    .await;
    ctx.post_form(
        "/cart/adjust",
        &[("product_id", product_id.as_str()), ("delta", "1")],
    )
    .await;

    let snapshot = ctx.state.cart().snapshot().await;
    let cart = snapshot.cart.expect("cart should be loaded");
    assert_eq!(cart.item(product.id).map(|i| i.quantity), Some(2));
}

#[tokio::test]
async fn test_remove_deletes_the_line() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("straw-boater").await;
    let product_id = product.id.to_string();

    ctx.post_form(
        "/cart/add",
        &[("product_id", product_id.as_str()), ("quantity", "3")],
    )
    .await;
    ctx.post_form("/cart/remove", &[("product_id", product_id.as_str())])
        .await;

    let snapshot = ctx.state.cart().snapshot().await;
    assert!(snapshot.cart.expect("cart should be loaded").is_empty());
}

#[tokio::test]
async fn test_clear_cart_is_idempotent_on_empty_cart() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.post_form("/cart/clear", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let snapshot = ctx.state.cart().snapshot().await;
    assert!(snapshot.cart.expect("cart should be loaded").is_empty());
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_server_totals_uphold_cart_invariants() {
    let ctx = TestContext::spawn().await;
    let fedora = ctx.backend_product("wool-fedora").await;
    let boater = ctx.backend_product("straw-boater").await;
    let fedora_id = fedora.id.to_string();
    let boater_id = boater.id.to_string();

    ctx.post_form(
        "/cart/add",
        &[("product_id", fedora_id.as_str()), ("quantity", "2")],
    )
    .await;
    ctx.post_form(
        "/cart/add",
        &[("product_id", boater_id.as_str()), ("quantity", "3")],
    )
    .await;
    ctx.post_form(
        "/cart/adjust",
        &[("product_id", boater_id.as_str()), ("delta", "-1")],
    )
    .await;

    let snapshot = ctx.state.cart().snapshot().await;
    let cart = snapshot.cart.expect("cart should be loaded");

    // total_items equals the sum of line quantities
    let quantity_sum: u32 = cart.items.iter().map(|i| i.quantity).sum();
    assert_eq!(cart.total_items, quantity_sum);

    // subtotal equals the sum of price x quantity over lines
    let line_sum: Price = cart.items.iter().map(|i| i.price.line_total(i.quantity)).sum();
    assert_eq!(cart.subtotal, line_sum);

    // Insertion order is preserved
    assert_eq!(cart.items.first().map(|i| i.product_id), Some(fedora.id));
    assert_eq!(cart.items.get(1).map(|i| i.product_id), Some(boater.id));
}

#[tokio::test]
async fn test_cart_count_fragment() {
    let ctx = TestContext::spawn().await;
    let product = ctx.backend_product("wool-fedora").await;
    let product_id = product.id.to_string();

    // Empty cart renders no badge at all
    let body = ctx
        .get("/cart/count")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(!body.contains("cart-badge"));

    ctx.post_form(
        "/cart/add",
        &[("product_id", product_id.as_str()), ("quantity", "4")],
    )
    .await;

    let body = ctx
        .get("/cart/count")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"cart-count\">4<"));
}
