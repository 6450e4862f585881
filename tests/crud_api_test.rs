mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn health_endpoint_reports_database_up() {
    let app = TestApp::new().await;

    let (status, body) = app.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn user_crud_round_trip() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Alice Johnson",
                "email": "alice@example.com",
                "address": "12 Rose St"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = app
        .request_json(Method::GET, &format!("/api/v1/users/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "alice@example.com");

    let (status, updated) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/users/{id}"),
            Some(json!({ "name": "Alice J.", "address": "9 Tulip Ave" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alice J.");
    assert_eq!(updated["email"], "alice@example.com");

    let response = app
        .request(Method::DELETE, &format!("/api/v1/users/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = app
        .request_json(Method::GET, &format!("/api/v1/users/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    app.seed_user("Alice Johnson", "alice@example.com").await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/users",
            Some(json!({ "name": "Impostor", "email": "alice@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn malformed_email_is_rejected_before_any_write() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/users",
            Some(json!({ "name": "Alice Johnson", "email": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = app.request_json(Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_crud_and_price_validation() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "product_name": "Laptop", "price": "-5" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "product_name": "Laptop", "price": "1000" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "price": "1200" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], "1200");

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn order_creation_parses_dates_and_checks_the_user() {
    let app = TestApp::new().await;
    let user = app.seed_user("Bob Smith", "bob@example.com").await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "user_id": user.id, "order_date": "2024-06-01T12:30:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_id"], user.id);
    assert_eq!(created["order_date"], "2024-06-01T12:30:00Z");

    // Defaulted order_date
    let (status, defaulted) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "user_id": user.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(defaulted["order_date"].is_string());

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "user_id": 9999 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "user_id": user.id, "order_date": "not-a-date" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_product_endpoint_defaults_quantity_to_one() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Headphones", dec!(150)).await;

    let (status, line) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/add_product/{}", order.id, product.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["quantity"], 1);
}

#[tokio::test]
async fn add_product_endpoint_accepts_an_explicit_quantity() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Smartphone", dec!(500)).await;

    let (status, line) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/add_product/{}", order.id, product.id),
            Some(json!({ "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["quantity"], 2);

    // Strict insert: a second add is a 400, not an upsert.
    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/add_product/{}", order.id, product.id),
            Some(json!({ "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn add_product_endpoint_rejects_a_malformed_body_without_writing() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Laptop", dec!(1000)).await;

    // A body that is present but does not parse must fail, not fall back
    // to the default quantity.
    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/add_product/{}", order.id, product.id),
            Some(json!({ "quantity": "three" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    // Nothing was inserted by the failed request.
    let (status, listed) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}/products", order.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn association_endpoints_map_not_found_cases_to_404() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Laptop", dec!(1000)).await;

    let (status, _) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/9999/add_product/{}", product.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/add_product/9999", order.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No line yet: removing is also a 404.
    let (status, _) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/orders/{}/remove_product/{}", order.id, product.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_products_listing_includes_product_fields_and_quantity() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let laptop = app.seed_product("Laptop", dec!(1000)).await;
    let phones = app.seed_product("Headphones", dec!(150)).await;

    for (product_id, quantity) in [(laptop.id, 1), (phones.id, 4)] {
        let (status, _) = app
            .request_json(
                Method::POST,
                &format!("/api/v1/orders/{}/add_product/{}", order.id, product_id),
                Some(json!({ "quantity": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, listed) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}/products", order.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], laptop.id);
    assert_eq!(listed[0]["product_name"], "Laptop");
    assert_eq!(listed[0]["price"], "1000");
    assert_eq!(listed[0]["quantity"], 1);
    assert_eq!(listed[1]["id"], phones.id);
    assert_eq!(listed[1]["quantity"], 4);
}

#[tokio::test]
async fn quantity_update_endpoint_validates_input() {
    let app = TestApp::new().await;
    let user = app.seed_user("Alice Johnson", "alice@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Smartphone", dec!(500)).await;

    app.state
        .order_lines
        .add_product(order.id, product.id, None)
        .await
        .unwrap();

    let (status, _) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/orders/{}/products/{}", order.id, product.id),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, line) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/orders/{}/products/{}", order.id, product.id),
            Some(json!({ "quantity": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["quantity"], 5);
}

#[tokio::test]
async fn remove_product_endpoint_confirms_the_removal() {
    let app = TestApp::new().await;
    let user = app.seed_user("Bob Smith", "bob@example.com").await;
    let order = app.seed_order(user.id).await;
    let product = app.seed_product("Headphones", dec!(150)).await;

    app.state
        .order_lines
        .add_product(order.id, product.id, None)
        .await
        .unwrap();

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/orders/{}/remove_product/{}", order.id, product.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (status, listed) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}/products", order.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}
