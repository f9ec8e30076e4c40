//! Cart flows against a running storefront.

use aura_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    assert_eq!(ctx.page("/health").await, "ok");
}

#[tokio::test]
async fn test_add_to_cart_shows_toast_and_opens_panel() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/cart/add"))
        .form(&[("id", "rose-oud"), ("return_to", "/products")])
        .send()
        .await
        .expect("add");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.url().path(), "/products");

    let body = resp.text().await.expect("body");
    assert!(body.contains("✓ Rose Oud added to cart"));
    assert!(body.contains("cart-panel is-open"));
    assert_eq!(ctx.cart_count().await, 1);
}

#[tokio::test]
async fn test_repeat_adds_bump_quantity() {
    let ctx = TestContext::new().await;

    ctx.add_to_cart("rose-oud", 1).await;
    ctx.add_to_cart("rose-oud", 2).await;
    ctx.add_to_cart("cedar-noir", 1).await;
    assert_eq!(ctx.cart_count().await, 4);

    let body = ctx.page("/cart").await;
    // 3 x 2,599 + 2,499, plus 99 shipping
    assert!(body.contains("PKR 10,296"));
    assert!(body.contains("PKR 10,395"));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("velvet-musk", 2).await;

    let resp = ctx
        .client
        .post(ctx.url("/cart/update"))
        .form(&[("id", "velvet-musk"), ("qty", "0"), ("return_to", "/cart")])
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(ctx.cart_count().await, 0);
    assert!(ctx.page("/cart").await.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_set_quantity_and_remove() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("rose-oud", 1).await;
    ctx.add_to_cart("cedar-noir", 1).await;

    ctx.client
        .post(ctx.url("/cart/update"))
        .form(&[("id", "rose-oud"), ("qty", "5")])
        .send()
        .await
        .expect("update");
    assert_eq!(ctx.cart_count().await, 6);

    ctx.client
        .post(ctx.url("/cart/remove"))
        .form(&[("id", "rose-oud")])
        .send()
        .await
        .expect("remove");
    assert_eq!(ctx.cart_count().await, 1);
}

#[tokio::test]
async fn test_clear_cart() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("rose-oud", 3).await;

    ctx.client
        .post(ctx.url("/cart/clear"))
        .form(&[("return_to", "/cart")])
        .send()
        .await
        .expect("clear");
    assert_eq!(ctx.cart_count().await, 0);
}

#[tokio::test]
async fn test_panel_open_and_close() {
    let ctx = TestContext::new().await;

    let body = ctx
        .client
        .post(ctx.url("/cart/open"))
        .form(&[("return_to", "/")])
        .send()
        .await
        .expect("open")
        .text()
        .await
        .expect("body");
    assert!(body.contains("cart-panel is-open"));

    let body = ctx
        .client
        .post(ctx.url("/cart/close"))
        .form(&[("return_to", "/")])
        .send()
        .await
        .expect("close")
        .text()
        .await
        .expect("body");
    assert!(!body.contains("cart-panel is-open"));
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/cart/add"))
        .form(&[("id", "no-such-scent")])
        .send()
        .await
        .expect("add");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.cart_count().await, 0);
}

#[tokio::test]
async fn test_offsite_return_target_falls_back_to_home() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .raw_client
        .post(ctx.url("/cart/add"))
        .form(&[("id", "rose-oud"), ("return_to", "//evil.example/")])
        .send()
        .await
        .expect("add");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn test_buy_now_goes_to_checkout() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .raw_client
        .post(ctx.url("/cart/add"))
        .form(&[("id", "midnight-amber"), ("buy_now", "1")])
        .send()
        .await
        .expect("buy now");
    assert_eq!(resp.headers()["location"], "/checkout");
    assert_eq!(ctx.cart_count().await, 1);
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let first = TestContext::new().await;
    first.add_to_cart("rose-oud", 2).await;

    let other = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client");
    let body = other
        .get(first.url("/cart/count"))
        .send()
        .await
        .expect("count")
        .text()
        .await
        .expect("body");
    assert!(body.contains(">0<"));
    assert_eq!(first.cart_count().await, 2);
}
