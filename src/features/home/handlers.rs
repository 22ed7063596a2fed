use axum::{http::StatusCode, Json};

use crate::shared::types::MessageResponse;

#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    responses((status = 200, description = "Welcome message", body = MessageResponse))
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "¡Bienvenido a la API del Centro de Datos!".to_string(),
    })
}

/// Simple health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "home",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
