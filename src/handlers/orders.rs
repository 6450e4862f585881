use crate::errors::ServiceError;
use crate::services::orders::CreateOrderRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Optional body for `add_product`; an absent body means quantity 1.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddProductRequest {
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// A product on an order, together with its line quantity.
#[derive(Debug, Serialize)]
pub struct OrderProductResponse {
    pub id: i32,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.orders.get_order(id).await?;
    Ok(Json(order))
}

async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_product(
    State(state): State<AppState>,
    Path((order_id, product_id)): Path<(i32, i32)>,
    body: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let quantity = match body {
        Ok(Json(request)) => request.quantity,
        // A request without a JSON body keeps the default quantity of one;
        // a body that is present but malformed must not reach the insert.
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return Err(ServiceError::ValidationError(rejection.body_text())),
    };
    let line = state
        .order_lines
        .add_product(order_id, product_id, quantity)
        .await?;
    Ok((StatusCode::OK, Json(line)))
}

async fn remove_product(
    State(state): State<AppState>,
    Path((order_id, product_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .order_lines
        .remove_product(order_id, product_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "order_id": order_id,
            "product_id": product_id,
            "removed": true,
        })),
    ))
}

async fn update_quantity(
    State(state): State<AppState>,
    Path((order_id, product_id)): Path<(i32, i32)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let line = state
        .order_lines
        .update_quantity(order_id, product_id, request.quantity)
        .await?;
    Ok(Json(line))
}

async fn list_order_products(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.order_lines.list_products(order_id).await?;
    let body: Vec<OrderProductResponse> = products
        .into_iter()
        .map(|(product, quantity)| OrderProductResponse {
            id: product.id,
            product_name: product.product_name,
            price: product.price,
            quantity,
        })
        .collect();
    Ok(Json(body))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id", delete(delete_order))
        .route("/:id/add_product/:product_id", post(add_product))
        .route("/:id/remove_product/:product_id", delete(remove_product))
        .route("/:id/products", get(list_order_products))
        .route("/:id/products/:product_id", put(update_quantity))
}
