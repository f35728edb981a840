//! Integration tests for catalog browsing: home, category, and product pages.

use reqwest::StatusCode;

use haberdash_integration_tests::TestContext;

#[tokio::test]
async fn test_home_renders_category_grid() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"category-grid\""));
    assert!(body.contains("Fedoras"));
    assert!(body.contains("Flat Caps"));
}

#[tokio::test]
async fn test_category_all_lists_every_product() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/category/all").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("All Products"));
    assert!(body.contains("Wool Fedora"));
    assert!(body.contains("Straw Boater"));
    assert!(body.contains("Tweed Flat Cap"));
}

#[tokio::test]
async fn test_category_filters_products() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/category/fedoras").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Wool Fedora"));
    assert!(!body.contains("Tweed Flat Cap"));
}

#[tokio::test]
async fn test_unknown_category_renders_not_found() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/category/bowlers").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"not-found\""));
    assert!(body.contains("Back to Home"));
}

#[tokio::test]
async fn test_product_page_renders_detail() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/product/wool-fedora").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"product-detail\""));
    assert!(body.contains("Wool Fedora"));
    assert!(body.contains("$49.00"));
    assert!(body.contains("data-testid=\"add-to-cart\""));
}

#[tokio::test]
async fn test_quantity_selector_clamps_to_stock_range() {
    let ctx = TestContext::spawn().await;

    // Default is 1
    let body = ctx
        .get("/product/wool-fedora")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"quantity-value\">1<"));

    // Below the floor lands on 1
    let body = ctx
        .get("/product/wool-fedora?qty=0")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"quantity-value\">1<"));

    // Above the ceiling lands on stock (5)
    let body = ctx
        .get("/product/wool-fedora?qty=99")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("data-testid=\"quantity-value\">5<"));
}

#[tokio::test]
async fn test_out_of_stock_product_has_no_add_to_cart() {
    let ctx = TestContext::spawn().await;

    let body = ctx
        .get("/product/tweed-flat-cap")
        .await
        .text()
        .await
        .expect("Failed to read response");
    assert!(body.contains("Out of Stock"));
    assert!(!body.contains("data-testid=\"add-to-cart\""));
}

#[tokio::test]
async fn test_unknown_product_renders_not_found() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/product/top-hat").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("data-testid=\"not-found\""));
}

#[tokio::test]
async fn test_health_endpoint() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read response"), "ok");
}
