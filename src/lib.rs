//! shop-api
//!
//! CRUD backend for a small shop: users, products, orders, and the
//! order/product line management that ties them together.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub users: services::users::UserService,
    pub products: services::products::ProductService,
    pub orders: services::orders::OrderService,
    pub order_lines: services::order_lines::OrderLineService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        Self {
            users: services::users::UserService::new(db.clone()),
            products: services::products::ProductService::new(db.clone()),
            orders: services::orders::OrderService::new(db.clone()),
            order_lines: services::order_lines::OrderLineService::new(db.clone()),
            db,
            config,
        }
    }
}

/// The v1 API surface: users, products, orders and their line endpoints.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", handlers::user_routes())
        .nest("/products", handlers::product_routes())
        .nest("/orders", handlers::order_routes())
}
