use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use shop_api::{
    api_routes,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{order, product, user},
    handlers::health_routes,
    services::{orders::CreateOrderRequest, products::CreateProductRequest, users::CreateUserRequest},
    AppState,
};
use tower::ServiceExt;

/// Helper harness wiring the router to a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // One pooled connection so every request sees the same in-memory DB.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("connect to in-memory sqlite");
        db::run_migrations(&pool).await.expect("run migrations");

        let cfg = AppConfig {
            database_url: db_config.url.clone(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: 1,
            db_min_connections: 1,
            request_timeout_secs: 5,
        };

        let state = AppState::new(Arc::new(pool), cfg);
        let router = Router::new()
            .merge(health_routes())
            .nest("/api/v1", api_routes())
            .with_state(state.clone());

        Self { router, state }
    }

    /// Issues a single request against the router.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder
                    .body(Body::from(json.to_string()))
                    .expect("build request")
            }
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }

    /// Issues a request and parses the JSON response body.
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, path, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse response body")
        };
        (status, json)
    }

    pub async fn seed_user(&self, name: &str, email: &str) -> user::Model {
        self.state
            .users
            .create_user(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                address: None,
            })
            .await
            .expect("seed user")
    }

    pub async fn seed_product(&self, name: &str, price: Decimal) -> product::Model {
        self.state
            .products
            .create_product(CreateProductRequest {
                product_name: name.to_string(),
                price,
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_order(&self, user_id: i32) -> order::Model {
        self.state
            .orders
            .create_order(CreateOrderRequest {
                user_id,
                order_date: None,
            })
            .await
            .expect("seed order")
    }
}
