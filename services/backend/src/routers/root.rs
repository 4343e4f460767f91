use axum::Json;
use crate::controllers::RootController;

pub async fn health_check_route() -> impl axum::response::IntoResponse {
    Json(RootController::health_check().await)
}
