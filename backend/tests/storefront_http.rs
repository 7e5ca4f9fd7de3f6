//! End-to-end coverage of the HTTP surface over fixture ports.
//!
//! These tests wire the real handlers, session middleware, and checkout
//! service against in-memory port implementations, so the full request
//! flows run without a database or network.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::{SessionMiddleware, config::CookieContentSecurity};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::Utc;
use uuid::Uuid;

use chasti_backend::Trace;
use chasti_backend::domain::CheckoutServiceImpl;
use chasti_backend::domain::catalog::{Product, ProductDraft};
use chasti_backend::domain::money::Money;
use chasti_backend::domain::ports::{
    FIXTURE_EMAIL, FIXTURE_PASSWORD, FIXTURE_SIGNATURE, FixtureAccountService,
    FixtureCatalogRepository, FixtureMailSender, FixtureOrderNotifier, FixtureOrderRepository,
    FixturePaymentGateway, FixtureProductsQuery, FixtureVehicleCatalog, FixtureVehicleLookup,
};
use chasti_backend::inbound::http::account::{current_customer, login, logout, register};
use chasti_backend::inbound::http::cart::{
    add_cart_item, clear_cart, get_cart, set_cart_item_quantity,
};
use chasti_backend::inbound::http::catalog::{list_brands, list_categories};
use chasti_backend::inbound::http::checkout::checkout;
use chasti_backend::inbound::http::orders::{get_order, list_orders};
use chasti_backend::inbound::http::payments::{
    SIGNATURE_HEADER, TIMESTAMP_HEADER, payment_callback,
};
use chasti_backend::inbound::http::products::{get_product, list_products};
use chasti_backend::inbound::http::state::{HttpState, HttpStatePorts};
use chasti_backend::inbound::http::vehicles::{
    decode_vin, list_vehicle_brands, list_vehicle_engines, list_vehicle_models,
};

fn demo_product(slug: &str, sku: &str, price_minor: i64, stock: i32) -> Product {
    let now = Utc::now();
    Product::new(ProductDraft {
        id: Uuid::new_v4(),
        slug: slug.to_owned(),
        sku: sku.to_owned(),
        name: format!("Demo {slug}"),
        description: String::new(),
        brand_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        price: Money::from_minor(price_minor).expect("fixture price"),
        compare_at: None,
        stock,
        image_urls: Vec::new(),
        oem_refs: Vec::new(),
        created_at: now,
        updated_at: now,
    })
    .expect("valid demo product")
}

fn demo_state(products: Vec<Product>) -> web::Data<HttpState> {
    let products_port = Arc::new(FixtureProductsQuery::with_products(products));
    let orders_port = Arc::new(FixtureOrderRepository::default());
    let checkout_service = Arc::new(CheckoutServiceImpl::new(
        products_port.clone(),
        orders_port.clone(),
        Arc::new(FixturePaymentGateway),
        Arc::new(FixtureMailSender),
        Arc::new(FixtureOrderNotifier),
    ));
    web::Data::new(HttpState::from(HttpStatePorts {
        accounts: Arc::new(FixtureAccountService),
        products: products_port,
        catalog: Arc::new(FixtureCatalogRepository::default()),
        vehicles: Arc::new(FixtureVehicleCatalog::default()),
        vin_lookup: Arc::new(FixtureVehicleLookup),
        orders: orders_port,
        checkout: checkout_service,
    }))
}

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build()
}

macro_rules! demo_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state.clone()).wrap(Trace).service(
                web::scope("/api/v1")
                    .wrap(session_middleware())
                    .service(list_products)
                    .service(get_product)
                    .service(list_brands)
                    .service(list_categories)
                    .service(list_vehicle_brands)
                    .service(list_vehicle_models)
                    .service(list_vehicle_engines)
                    .service(decode_vin)
                    .service(get_cart)
                    .service(add_cart_item)
                    .service(set_cart_item_quantity)
                    .service(clear_cart)
                    .service(checkout)
                    .service(payment_callback)
                    .service(list_orders)
                    .service(get_order)
                    .service(register)
                    .service(login)
                    .service(logout)
                    .service(current_customer),
            ),
        )
        .await
    };
}

fn session_cookie<B>(res: &actix_web::dev::ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
}

#[actix_web::test]
async fn product_listing_returns_envelope() {
    let state = demo_state(vec![demo_product("brake-pads", "BP-1", 5_990, 10)]);
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/products").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body.get("page").and_then(serde_json::Value::as_u64), Some(1));
    assert_eq!(
        body.get("items")
            .and_then(serde_json::Value::as_array)
            .map(Vec::len),
        Some(1)
    );
}

#[actix_web::test]
async fn malformed_listing_parameters_are_rejected() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/products?min_price=5000&max_price=100")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("code").and_then(serde_json::Value::as_str),
        Some("invalid_request")
    );
}

#[actix_web::test]
async fn unknown_product_detail_is_404() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/products/no-such-part")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cart_add_and_remove_round_trip() {
    let product = demo_product("brake-pads", "BP-1", 5_990, 10);
    let product_id = product.id();
    let state = demo_state(vec![product]);
    let app = demo_app!(state);

    let add = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .set_json(serde_json::json!({ "productId": product_id, "quantity": 2 }))
            .to_request(),
    )
    .await;
    assert_eq!(add.status(), StatusCode::OK);
    let cookie = session_cookie(&add).expect("session cookie set");
    let body: serde_json::Value = test::read_body_json(add).await;
    assert_eq!(
        body.get("subtotal").and_then(serde_json::Value::as_i64),
        Some(11_980)
    );

    let remove = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/cart/items/{product_id}"))
            .cookie(cookie.clone())
            .set_json(serde_json::json!({ "quantity": 0 }))
            .to_request(),
    )
    .await;
    assert_eq!(remove.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(remove).await;
    assert_eq!(
        body.get("lines")
            .and_then(serde_json::Value::as_array)
            .map(Vec::len),
        Some(0)
    );
}

#[actix_web::test]
async fn adding_unknown_product_is_404() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .set_json(serde_json::json!({ "productId": Uuid::new_v4(), "quantity": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_and_payment_callback_flow() {
    let product = demo_product("brake-pads", "BP-1", 5_990, 10);
    let product_id = product.id();
    let state = demo_state(vec![product]);
    let app = demo_app!(state);

    let add = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .set_json(serde_json::json!({ "productId": product_id, "quantity": 1 }))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&add).expect("session cookie set");

    let checkout_res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/checkout")
            .cookie(cookie.clone())
            .set_json(serde_json::json!({
                "email": "guest@example.bg",
                "recipient": "Ivan Petrov",
                "phone": "0888123456",
                "city": "Sofia",
                "postcode": "1000",
                "addressLine": "bul. Vitosha 1",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(checkout_res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(checkout_res).await;
    let reference = body
        .get("reference")
        .and_then(serde_json::Value::as_str)
        .expect("order reference")
        .to_owned();
    assert!(
        body.get("redirectUrl")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|url| url.contains(&reference))
    );

    let callback_body = serde_json::json!({
        "event": "payment.completed",
        "reference": reference,
        "sessionId": format!("ps_{reference}"),
    });
    let confirm = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/callback")
            .insert_header((SIGNATURE_HEADER, FIXTURE_SIGNATURE))
            .insert_header((TIMESTAMP_HEADER, "0"))
            .set_json(&callback_body)
            .to_request(),
    )
    .await;
    assert_eq!(confirm.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(confirm).await;
    assert_eq!(body.get("status").and_then(serde_json::Value::as_str), Some("paid"));
    assert_eq!(body.get("acted").and_then(serde_json::Value::as_bool), Some(true));

    // Replays acknowledge without re-running side effects.
    let replay = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/callback")
            .insert_header((SIGNATURE_HEADER, FIXTURE_SIGNATURE))
            .insert_header((TIMESTAMP_HEADER, "0"))
            .set_json(&callback_body)
            .to_request(),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(replay).await;
    assert_eq!(body.get("acted").and_then(serde_json::Value::as_bool), Some(false));

    // Guest order lookup requires the matching contact email.
    let detail = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/orders/{reference}?email=guest@example.bg"
            ))
            .to_request(),
    )
    .await;
    assert_eq!(detail.status(), StatusCode::OK);

    let wrong_email = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{reference}?email=other@example.bg"))
            .to_request(),
    )
    .await;
    assert_eq!(wrong_email.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn forged_payment_callback_is_rejected() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/callback")
            .insert_header((SIGNATURE_HEADER, "forged"))
            .insert_header((TIMESTAMP_HEADER, "0"))
            .set_json(serde_json::json!({
                "event": "payment.completed",
                "reference": "CH-7K2M9QARZX",
                "sessionId": "ps_1",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn empty_cart_checkout_is_rejected() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/checkout")
            .set_json(serde_json::json!({
                "email": "guest@example.bg",
                "recipient": "Ivan Petrov",
                "phone": "0888123456",
                "city": "Sofia",
                "postcode": "1000",
                "addressLine": "bul. Vitosha 1",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_and_account_round_trip() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let anonymous = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/account").to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let login_res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/account/login")
            .set_json(serde_json::json!({
                "email": FIXTURE_EMAIL,
                "password": FIXTURE_PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(login_res.status(), StatusCode::OK);
    let cookie = session_cookie(&login_res).expect("session cookie set");

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/account")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(me).await;
    assert_eq!(
        body.get("email").and_then(serde_json::Value::as_str),
        Some(FIXTURE_EMAIL)
    );

    let logout_res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/account/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout_res.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&logout_res).expect("updated session cookie");

    let after = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/account")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/account/login")
            .set_json(serde_json::json!({
                "email": FIXTURE_EMAIL,
                "password": "wrong-password",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn short_registration_password_is_rejected() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/account/register")
            .set_json(serde_json::json!({
                "email": "new@example.bg",
                "displayName": "New Customer",
                "password": "short",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn orders_listing_requires_login() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/orders").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn vin_decode_validates_shape_and_returns_candidates() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let bad = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/vehicles/vin/NOT-A-VIN")
            .to_request(),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let good = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/vehicles/vin/WVWZZZ1KZ6W000001")
            .to_request(),
    )
    .await;
    assert_eq!(good.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(good).await;
    assert_eq!(
        body.as_array().map(Vec::len),
        Some(1),
        "fixture lookup returns one candidate"
    );
}

#[actix_web::test]
async fn trace_header_is_present_on_every_response() {
    let state = demo_state(Vec::new());
    let app = demo_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/brands").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-trace-id"));
}
