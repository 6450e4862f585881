use crate::errors::ServiceError;
use crate::services::products::{CreateProductRequest, UpdateProductRequest};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.get_product(id).await?;
    Ok(Json(product))
}

async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let products = state.products.list_products().await?;
    Ok(Json(products))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.update_product(id, request).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}
