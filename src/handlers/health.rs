use crate::{db, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::ping(state.db.as_ref()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "up" })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "down" })),
        ),
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
