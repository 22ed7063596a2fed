use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::features::files::models::{inventory_items, FileRecord, NewFileRecord};
use crate::modules::storage::{Direction, RemoteStore, Row, StoreError};
use crate::modules::tabular::{parse_file, TabularFormat};
use crate::shared::constants::FILE_STATUS_SUCCESS;
use crate::shared::validation::{secure_filename, tabular_format};

/// File received from the client, before anything is written anywhere
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Where uploads are staged and persisted
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub upload_dir: PathBuf,
    pub bucket: String,
    pub files_table: String,
    pub inventory_table: String,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_dir: config.upload.dir.clone(),
            bucket: config.supabase.bucket.clone(),
            files_table: config.supabase.files_table.clone(),
            inventory_table: config.supabase.inventory_table.clone(),
        }
    }
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub record: FileRecord,
    pub rows_processed: usize,
}

/// Service for file ingestion and listing
pub struct FileService {
    store: Arc<dyn RemoteStore>,
    settings: UploadSettings,
}

impl FileService {
    pub fn new(store: Arc<dyn RemoteStore>, settings: UploadSettings) -> Self {
        Self { store, settings }
    }

    /// Ingest one uploaded file.
    ///
    /// The file is staged in the upload directory, parsed, written to the
    /// object store, recorded in the files table and expanded into one
    /// inventory row per data row. The staged copy is removed on every exit
    /// path. A failed insert undoes the earlier remote writes, so the object,
    /// the record and its inventory rows are kept together or not at all.
    ///
    /// # Arguments
    /// * `file` - The uploaded file
    /// * `company_name` - Display name stored with the record
    /// * `owner_id` - Identity recorded as the owner of the upload
    pub async fn upload_file(
        &self,
        file: UploadedFile,
        company_name: &str,
        owner_id: &str,
    ) -> Result<UploadOutcome> {
        let format = tabular_format(&file.file_name)
            .ok_or_else(|| AppError::BadRequest("Tipo de archivo no permitido".to_string()))?;
        let safe_name = secure_filename(&file.file_name);
        if safe_name.is_empty() {
            return Err(AppError::BadRequest(
                "Tipo de archivo no permitido".to_string(),
            ));
        }

        let staged = self.stage_locally(&file.data, format).await?;
        let table = parse_file(staged.path(), format).await?;
        let rows_processed = table.row_count();

        let storage_path = format!("{}/files/{}", owner_id, safe_name);
        let size = file.data.len() as i64;
        self.store
            .upload_object(
                &self.settings.bucket,
                &storage_path,
                file.data,
                &file.content_type,
            )
            .await?;
        debug!("Object stored at '{}/{}'", self.settings.bucket, storage_path);

        let new_record = NewFileRecord {
            name: company_name.to_string(),
            original_name: file.file_name,
            size,
            content_type: file.content_type,
            storage_path: storage_path.clone(),
            content: table.into_content(),
            status: FILE_STATUS_SUCCESS.to_string(),
            user_id: owner_id.to_string(),
        };

        let row = match self.insert_record(&new_record).await {
            Ok(row) => row,
            Err(e) => {
                self.discard_object(&storage_path).await;
                return Err(e);
            }
        };

        let file_id = row.get("id").cloned().unwrap_or(Value::Null);
        let items = inventory_items(&new_record.content, &file_id, owner_id);
        if !items.is_empty() {
            if let Err(e) = self
                .store
                .insert_many(&self.settings.inventory_table, items)
                .await
            {
                self.discard_record(&file_id).await;
                self.discard_object(&storage_path).await;
                return Err(e.into());
            }
        }

        if let Err(e) = staged.close() {
            warn!("Failed to remove staged upload: {}", e);
        }

        // Everything is persisted from here on; a row that does not decode is
        // reported but not rolled back.
        let record = decode_record(Value::Object(row)).map_err(|e| {
            error!("File stored at '{}' but its record could not be read: {}", storage_path, e);
            AppError::from(e)
        })?;

        info!(
            "File ingested: id={}, name={}, path={}, rows={}",
            record.id, record.name, record.storage_path, rows_processed
        );

        Ok(UploadOutcome {
            record,
            rows_processed,
        })
    }

    /// All file records, newest first
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let rows = self
            .store
            .list(&self.settings.files_table, "created_at", Direction::Descending)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match decode_record(Value::Object(row)) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable file record: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Write the upload to a uniquely named file in the upload directory
    async fn stage_locally(&self, data: &[u8], format: TabularFormat) -> Result<NamedTempFile> {
        let suffix = format!(".{}", format.extension());
        let staged = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.settings.upload_dir)?;

        tokio::fs::write(staged.path(), data).await?;
        debug!("Upload staged at {}", staged.path().display());
        Ok(staged)
    }

    async fn insert_record(&self, record: &NewFileRecord) -> Result<Row> {
        let payload = serde_json::to_value(record)
            .map_err(|e| AppError::Internal(format!("Failed to serialize file record: {}", e)))?;

        Ok(self
            .store
            .insert(&self.settings.files_table, payload)
            .await?)
    }

    /// Remove the file record whose inventory could not be written
    async fn discard_record(&self, file_id: &Value) {
        let id = match file_id {
            Value::String(text) => text.clone(),
            Value::Null => {
                error!("Inventory insert failed and the file record has no id to remove");
                return;
            }
            other => other.to_string(),
        };

        match self
            .store
            .delete_where(&self.settings.files_table, "id", &id)
            .await
        {
            Ok(()) => warn!("Inventory insert failed; removed file record {}", id),
            Err(e) => error!(
                "Inventory insert failed and file record {} could not be removed: {}",
                id, e
            ),
        }
    }

    /// Compensate a failed insert by deleting the object it would have described
    async fn discard_object(&self, storage_path: &str) {
        match self
            .store
            .delete_object(&self.settings.bucket, storage_path)
            .await
        {
            Ok(()) => warn!("Insert failed; removed orphaned object '{}'", storage_path),
            Err(e) => error!(
                "Insert failed and object '{}' could not be removed: {}",
                storage_path, e
            ),
        }
    }
}

fn decode_record(row: Value) -> std::result::Result<FileRecord, StoreError> {
    serde_json::from_value(row)
        .map_err(|e| StoreError::UnexpectedResponse(format!("Invalid file record: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryStore;
    use serde_json::json;
    use tempfile::TempDir;

    const OWNER: &str = "owner-1";

    fn service_with(store: Arc<InMemoryStore>) -> (FileService, TempDir) {
        let upload_dir = tempfile::tempdir().unwrap();
        let settings = UploadSettings {
            upload_dir: upload_dir.path().to_path_buf(),
            bucket: "files".to_string(),
            files_table: "files".to_string(),
            inventory_table: "inventory".to_string(),
        };
        (FileService::new(store, settings), upload_dir)
    }

    fn csv_upload(name: &str, contents: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "text/csv".to_string(),
            data: contents.as_bytes().to_vec(),
        }
    }

    fn staged_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_upload_persists_object_and_record() {
        let store = Arc::new(InMemoryStore::default());
        let (service, dir) = service_with(store.clone());

        let outcome = service
            .upload_file(csv_upload("data.csv", "a,b\n1,2\n"), "Acme", OWNER)
            .await
            .unwrap();

        assert_eq!(outcome.rows_processed, 1);
        assert_eq!(outcome.record.name, "Acme");
        assert_eq!(outcome.record.original_name, "data.csv");
        assert_eq!(outcome.record.storage_path, "owner-1/files/data.csv");
        assert_eq!(outcome.record.size, 8);
        assert_eq!(outcome.record.content_type, "text/csv");
        assert_eq!(outcome.record.status, "success");
        assert_eq!(outcome.record.user_id, OWNER);
        assert_eq!(
            outcome.record.content,
            vec![vec![json!("a"), json!("b")], vec![json!(1), json!(2)]]
        );
        assert_eq!(
            store.object("files", "owner-1/files/data.csv"),
            Some(b"a,b\n1,2\n".to_vec())
        );
        assert_eq!(store.rows("files").len(), 1);
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_cells_are_stored_as_empty_strings() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());

        service
            .upload_file(csv_upload("stock.csv", "sku,qty\nA1,\n,4\n"), "Acme", OWNER)
            .await
            .unwrap();

        let stored = &store.rows("files")[0];
        assert_eq!(
            stored["content"],
            json!([["sku", "qty"], ["A1", ""], ["", 4]])
        );
    }

    #[tokio::test]
    async fn test_disallowed_extension_has_no_side_effects() {
        let store = Arc::new(InMemoryStore::default());
        let (service, dir) = service_with(store.clone());

        let err = service
            .upload_file(csv_upload("report.pdf", "%PDF-1.4"), "Acme", OWNER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Tipo de archivo no permitido"));
        assert!(store.calls().is_empty());
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_removes_staged_file() {
        let store = Arc::new(InMemoryStore::default());
        let (service, dir) = service_with(store.clone());

        let err = service
            .upload_file(csv_upload("broken.csv", "a,b\n1,2,3\n"), "Acme", OWNER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Processing(_)));
        assert!(store.calls().is_empty());
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_removes_staged_file() {
        let store = Arc::new(InMemoryStore::failing_uploads("storage unavailable"));
        let (service, dir) = service_with(store.clone());

        let err = service
            .upload_file(csv_upload("data.csv", "a\n1\n"), "Acme", OWNER)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Remote store error: storage unavailable");
        assert_eq!(store.calls(), vec!["upload files/owner-1/files/data.csv"]);
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_deletes_uploaded_object() {
        let store = Arc::new(InMemoryStore::failing_inserts("permission denied for table files"));
        let (service, dir) = service_with(store.clone());

        let err = service
            .upload_file(csv_upload("data.csv", "a\n1\n"), "Acme", OWNER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(
            store.calls(),
            vec![
                "upload files/owner-1/files/data.csv",
                "insert files",
                "delete files/owner-1/files/data.csv",
            ]
        );
        assert_eq!(store.object_count(), 0);
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_upload_xlsx_workbook() {
        let store = Arc::new(InMemoryStore::default());
        let (service, dir) = service_with(store.clone());
        let workbook = std::fs::read(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/inventario.xlsx"),
        )
        .unwrap();

        let outcome = service
            .upload_file(
                UploadedFile {
                    file_name: "inventario.xlsx".to_string(),
                    content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                        .to_string(),
                    data: workbook,
                },
                "Acme",
                OWNER,
            )
            .await
            .unwrap();

        assert_eq!(outcome.rows_processed, 2);
        assert_eq!(
            outcome.record.content[0],
            vec![json!("Producto"), json!("Precio"), json!("Cantidad")]
        );
        assert_eq!(store.rows("inventory")[1]["producto"], "Clavos");
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_upload_expands_rows_into_inventory() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());

        let outcome = service
            .upload_file(
                csv_upload("stock.csv", "SKU,Cantidad Total\nA1,4\nB2,\n"),
                "Acme",
                OWNER,
            )
            .await
            .unwrap();

        let inventory = store.rows("inventory");
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0]["sku"], "A1");
        assert_eq!(inventory[0]["cantidad_total"], 4);
        assert_eq!(inventory[1]["cantidad_total"], "");
        assert!(inventory.iter().all(|item| item["file_id"] == outcome.record.id));
        assert!(inventory.iter().all(|item| item["user_id"] == OWNER));
        assert!(store.calls().contains(&"insert inventory x2".to_string()));
    }

    #[tokio::test]
    async fn test_header_only_file_writes_no_inventory() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());

        let outcome = service
            .upload_file(csv_upload("empty.csv", "a,b\n"), "Acme", OWNER)
            .await
            .unwrap();

        assert_eq!(outcome.rows_processed, 0);
        assert!(store.calls().iter().all(|call| !call.starts_with("insert inventory")));
    }

    #[tokio::test]
    async fn test_inventory_failure_removes_record_and_object() {
        let store = Arc::new(
            InMemoryStore::default()
                .with_integer_ids()
                .with_failing_inserts_into("inventory", "null value in column \"sku\""),
        );
        let (service, dir) = service_with(store.clone());

        let err = service
            .upload_file(csv_upload("data.csv", "sku\nA1\n"), "Acme", OWNER)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Remote store error: null value in column \"sku\"");
        assert_eq!(
            store.calls(),
            vec![
                "upload files/owner-1/files/data.csv",
                "insert files",
                "insert inventory x1",
                "delete files where id=1",
                "delete files/owner-1/files/data.csv",
            ]
        );
        assert!(store.rows("files").is_empty());
        assert!(store.rows("inventory").is_empty());
        assert_eq!(store.object_count(), 0);
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_integer_ids_keep_object_and_record() {
        let store = Arc::new(InMemoryStore::default().with_integer_ids());
        let (service, _dir) = service_with(store.clone());

        let outcome = service
            .upload_file(csv_upload("data.csv", "a\n1\n"), "Acme", OWNER)
            .await
            .unwrap();

        assert_eq!(outcome.record.id, json!(1));
        assert_eq!(store.rows("files").len(), 1);
        assert_eq!(store.object_count(), 1);
        assert!(store.calls().iter().all(|call| !call.starts_with("delete")));
        assert_eq!(store.rows("inventory")[0]["file_id"], json!(1));
    }

    #[tokio::test]
    async fn test_same_filename_overwrites_object() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());

        for contents in ["a\n1\n", "a\n2\n3\n"] {
            service
                .upload_file(csv_upload("data.csv", contents), "Acme", OWNER)
                .await
                .unwrap();
        }

        assert_eq!(store.object_count(), 1);
        assert_eq!(
            store.object("files", "owner-1/files/data.csv"),
            Some(b"a\n2\n3\n".to_vec())
        );
        assert_eq!(store.rows("files").len(), 2);
    }

    #[tokio::test]
    async fn test_storage_path_uses_sanitized_name() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());

        let outcome = service
            .upload_file(csv_upload("../Inventario Marzo.CSV", "a\n1\n"), "Acme", OWNER)
            .await
            .unwrap();

        assert_eq!(outcome.record.storage_path, "owner-1/files/Inventario_Marzo.CSV");
        assert_eq!(outcome.record.original_name, "../Inventario Marzo.CSV");
    }

    #[tokio::test]
    async fn test_list_files_newest_first() {
        let store = Arc::new(InMemoryStore::default());
        let (service, _dir) = service_with(store.clone());
        for name in ["uno.csv", "dos.csv", "tres.csv"] {
            service
                .upload_file(csv_upload(name, "a\n1\n"), "Acme", OWNER)
                .await
                .unwrap();
        }

        let files = service.list_files().await.unwrap();

        let names: Vec<_> = files.iter().map(|f| f.original_name.as_str()).collect();
        assert_eq!(names, vec!["tres.csv", "dos.csv", "uno.csv"]);
        assert!(files.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_list_files_tolerates_legacy_rows() {
        let store = Arc::new(InMemoryStore::default().with_rows(
            "files",
            vec![
                json!({
                    "id": 41,
                    "name": "Legacy",
                    "original_name": "old.xlsx",
                    "size": 1024,
                    "type": null,
                    "storage_path": "legacy/old.xlsx",
                    "content": [["sku"], ["A1"]],
                    "status": null,
                    "user_id": null,
                    "created_at": "2024-06-01T10:00:00+00:00"
                }),
                json!({ "id": 42, "name": "No timestamp" }),
            ],
        ));
        let (service, _dir) = service_with(store);

        let files = service.list_files().await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, json!(41));
        assert_eq!(files[0].status, "");
        assert_eq!(files[0].content_type, "");
        assert_eq!(files[0].user_id, "");
    }

    #[tokio::test]
    async fn test_list_files_reports_store_failure() {
        let store = Arc::new(InMemoryStore::default().with_failing_table("files"));
        let (service, _dir) = service_with(store);

        let err = service.list_files().await.unwrap_err();

        assert!(matches!(err, AppError::Store(StoreError::Api { status: 404, .. })));
    }
}
