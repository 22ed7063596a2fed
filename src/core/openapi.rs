use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::home::handlers as home_handlers;
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Home
        home_handlers::welcome,
        home_handlers::health_check,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            files_models::FileRecord,
            files_dtos::UploadFileDto,
            files_dtos::UploadResponseDto,
        )
    ),
    tags(
        (name = "home", description = "Welcome and liveness endpoints"),
        (name = "files", description = "Tabular file upload and listing"),
    ),
    info(
        title = "Centro de Datos API",
        version = "0.1.0",
        description = "File ingestion API for the Centro de Datos",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
