use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::core::error::AppError;
use crate::features::files::dtos::{UploadFileDto, UploadResponseDto, MAX_FILE_SIZE};
use crate::features::files::models::FileRecord;
use crate::features::files::routes::FilesState;
use crate::features::files::services::UploadedFile;
use crate::shared::types::ErrorResponse;
use crate::shared::validation::allowed_file;

/// Upload a tabular file
///
/// Accepts multipart/form-data with:
/// - `file`: CSV, XLSX or XLS file (required)
/// - `company_name`: display name stored with the record (required)
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Tabular file plus the company name it belongs to",
    ),
    responses(
        (status = 200, description = "File processed", body = UploadResponseDto),
        (status = 400, description = "Missing file or name, or file type not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or remote store failure", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<FilesState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut company_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "company_name" => {
                let text = field.text().await.map_err(multipart_error)?;
                company_name = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file = file
        .ok_or_else(|| AppError::BadRequest("No se envió ningún archivo".to_string()))?;
    if file.file_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "No se seleccionó ningún archivo".to_string(),
        ));
    }
    let company_name = company_name.ok_or_else(|| {
        AppError::BadRequest("El nombre de la empresa es requerido".to_string())
    })?;
    if !allowed_file(&file.file_name) {
        return Err(AppError::BadRequest(
            "Tipo de archivo no permitido".to_string(),
        ));
    }
    if file.data.len() > MAX_FILE_SIZE {
        return Err(too_large());
    }

    let outcome = state
        .service
        .upload_file(file, &company_name, &state.owner_id)
        .await?;

    Ok(Json(UploadResponseDto {
        message: "Archivo procesado correctamente".to_string(),
        file_data: outcome.record,
        rows_processed: outcome.rows_processed,
    }))
}

/// List uploaded files
///
/// Returns every file record ordered by creation time, newest first.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "File records, newest first", body = Vec<FileRecord>),
        (status = 500, description = "Remote store failure", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<FilesState>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    Ok(Json(state.service.list_files().await?))
}

fn too_large() -> AppError {
    AppError::PayloadTooLarge(format!(
        "Archivo demasiado grande. El tamaño máximo es {} MB",
        MAX_FILE_SIZE / 1024 / 1024
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::BadRequest(format!("Error al leer los datos del formulario: {}", e.body_text()))
    }
}
