use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{list_files, upload_file};
use crate::features::files::services::FileService;

/// Shared state of the files routes
#[derive(Clone)]
pub struct FilesState {
    pub service: Arc<FileService>,
    /// Identity recorded on uploads until requests carry an authenticated user
    pub owner_id: Arc<str>,
}

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, owner_id: &str) -> Router {
    let state = FilesState {
        service: file_service,
        owner_id: Arc::from(owner_id),
    };

    Router::new()
        .route(
            "/api/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_file).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/files", get(list_files))
        .with_state(state)
}
