use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::FileRecord;

/// Maximum file size in bytes (16MB)
pub const MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// CSV, XLSX or XLS file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Display name stored with the file
    #[schema(example = "Acme")]
    pub company_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    #[schema(example = "Archivo procesado correctamente")]
    pub message: String,
    pub file_data: FileRecord,
    /// Number of data rows, header excluded
    pub rows_processed: usize,
}
