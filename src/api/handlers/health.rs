use crate::types::WelcomeResponse;
use axum::Json;

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = WelcomeResponse)),
    tag = "health"
)]
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the askrag GenAI API!".to_string(),
    })
}

/// Plain-text health check
pub async fn health() -> &'static str {
    "OK"
}
