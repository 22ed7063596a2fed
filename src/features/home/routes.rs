use axum::{routing::get, Router};

use crate::features::home::handlers;

pub fn routes() -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
}
