//! Checkout from catalog to confirmation against a mock API.

#![allow(clippy::unwrap_used)]

use mangaverse_core::{PaymentMethod, UserId, UserRole};
use mangaverse_integration_tests::{TestContext, cart_product, product_json, shipping_form};
use mangaverse_storefront::api::types::PaypalCapture;
use mangaverse_storefront::checkout::CheckoutStep;
use mangaverse_storefront::shell::{NoticeLevel, Route};
use mangaverse_storefront::stores::{AuthStore, Session, UserProfile};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn sign_in(auth: &mut AuthStore) {
    auth.establish(Session::new(
        UserProfile {
            id: UserId::new("u-tenma"),
            name: "Kenzo Tenma".into(),
            email: "tenma@eisler.de".into(),
            role: UserRole::User,
        },
        "tok-tenma",
    ));
}

async fn stock_catalog(ctx: &TestContext, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json("m1", "Monster 1", 14.99, 3),
            product_json("m2", "Pluto 1", 12.50, 5),
        ])))
        .expect(expected_fetches)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_cash_on_delivery_order_clears_persisted_cart() {
    let ctx = TestContext::new().await;
    stock_catalog(&ctx, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer tok-tenma"))
        .and(body_partial_json(json!({
            "orderItems": [
                {"productId": "m1", "name": "Monster 1", "quantity": 2, "price": 14.99},
                {"productId": "m2", "name": "Pluto 1", "quantity": 1, "price": 12.5}
            ],
            "shippingAddress": {"fullName": "Kenzo Tenma", "country": "Germany"},
            "paymentMethod": "cod",
            "totalAmount": 42.48
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "order": {"_id": "o-100"}})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let catalog = ctx.catalog();
    let products = catalog.list_products().await.unwrap();
    catalog.list_products().await.unwrap();
    let mut cart = ctx.cart();
    catalog.add_to_cart(&mut cart, &products[0]);
    catalog.add_to_cart(&mut cart, &products[0]);
    catalog.add_to_cart(&mut cart, &products[1]);
    assert!(catalog.proceed_to_checkout(&cart));

    let mut auth = ctx.auth();
    sign_in(&mut auth);

    let mut flow = ctx.checkout();
    assert!(flow.guard(&cart));
    *flow.shipping_form_mut() = shipping_form();
    assert_eq!(flow.next().unwrap(), CheckoutStep::Payment);
    flow.select_payment_method(PaymentMethod::CashOnDelivery);
    assert_eq!(flow.next().unwrap(), CheckoutStep::Review);

    let order_id = flow.submit(&mut cart, &auth).await.unwrap();
    assert_eq!(order_id.as_str(), "o-100");
    assert!(flow.order_placed());
    assert!(cart.is_empty());
    assert!(ctx.cart().is_empty());
    assert_eq!(ctx.shell.last_route(), Some(Route::OrderConfirmation(order_id)));
    assert!(
        ctx.shell
            .messages(NoticeLevel::Success)
            .contains(&"Order created successfully!".to_owned())
    );

    // Placing the order drops the cached listing.
    catalog.list_products().await.unwrap();
}

#[tokio::test]
async fn test_refused_order_keeps_cart_and_review_step() {
    let ctx = TestContext::new().await;
    stock_catalog(&ctx, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Out of stock"})))
        .mount(&ctx.server)
        .await;

    let catalog = ctx.catalog();
    let products = catalog.list_products().await.unwrap();
    let mut cart = ctx.cart();
    catalog.add_to_cart(&mut cart, &products[0]);
    let mut auth = ctx.auth();
    sign_in(&mut auth);

    let mut flow = ctx.checkout();
    *flow.shipping_form_mut() = shipping_form();
    flow.next().unwrap();
    flow.select_payment_method(PaymentMethod::CashOnDelivery);
    flow.next().unwrap();

    assert!(flow.submit(&mut cart, &auth).await.is_err());
    assert_eq!(flow.step(), CheckoutStep::Review);
    assert!(!flow.order_placed());
    assert_eq!(ctx.cart().total_items(), 1);
    assert_eq!(
        ctx.shell.messages(NoticeLevel::Error),
        vec!["Operation Failed: Out of stock"]
    );
}

#[tokio::test]
async fn test_mpesa_order_sends_stk_push() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({"paymentMethod": "mpesa"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "order": {"_id": "o-mp"}})),
        )
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/mpesa/stk-push"))
        .and(body_partial_json(json!({
            "phoneNumber": "254712345678",
            "amount": 14.99,
            "orderId": "o-mp",
            "description": "MangaVerse - Order: o-mp"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"ResponseCode": "0", "CustomerMessage": "Success. Request accepted for processing"}
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut cart = ctx.cart();
    cart.add_to_cart(cart_product("m1", "Monster 1", 1499));
    let mut auth = ctx.auth();
    sign_in(&mut auth);

    let mut flow = ctx.checkout();
    *flow.shipping_form_mut() = shipping_form();
    flow.next().unwrap();
    flow.select_payment_method(PaymentMethod::Mpesa);
    flow.payment_form_mut().mpesa_phone = "254712345678".into();
    flow.next().unwrap();

    flow.submit(&mut cart, &auth).await.unwrap();
    assert!(cart.is_empty());
    assert!(
        ctx.shell
            .messages(NoticeLevel::Success)
            .contains(&"M-Pesa STK Push sent! Check your phone to complete payment.".to_owned())
    );
}

#[tokio::test]
async fn test_paypal_capture_becomes_order() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({
            "paymentMethod": "paypal",
            "paymentResult": {"id": "CAP-9", "status": "COMPLETED"}
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "order": {"_id": "o-pp"}})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut cart = ctx.cart();
    cart.add_to_cart(cart_product("m2", "Pluto 1", 1250));
    let mut auth = ctx.auth();
    sign_in(&mut auth);

    let mut flow = ctx.checkout();
    *flow.shipping_form_mut() = shipping_form();
    flow.next().unwrap();
    flow.select_payment_method(PaymentMethod::PayPal);

    // The Next button defers to the PayPal widget.
    assert_eq!(flow.next().unwrap(), CheckoutStep::Payment);
    assert_eq!(flow.paypal_purchase_unit(&cart).amount.value, "12.50");

    let capture = PaypalCapture {
        id: "CAP-9".into(),
        status: "COMPLETED".into(),
        update_time: "2025-06-01T12:00:00Z".into(),
        email_address: None,
    };
    let order_id = flow.approve_paypal(capture, &mut cart, &auth).await.unwrap();
    assert_eq!(order_id.as_str(), "o-pp");
    assert!(ctx.cart().is_empty());
}

#[tokio::test]
async fn test_signed_out_checkout_is_sent_to_login() {
    let ctx = TestContext::new().await;
    let mut cart = ctx.cart();
    cart.add_to_cart(cart_product("m1", "Monster 1", 1499));

    let mut flow = ctx.checkout();
    *flow.shipping_form_mut() = shipping_form();
    flow.next().unwrap();
    flow.select_payment_method(PaymentMethod::CashOnDelivery);
    flow.next().unwrap();

    assert!(flow.submit(&mut cart, &ctx.auth()).await.is_err());
    assert_eq!(ctx.shell.last_route(), Some(Route::Login));
    assert_eq!(ctx.cart().total_items(), 1);
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
}
