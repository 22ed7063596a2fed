use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Persisted row of the `files` table.
///
/// Rows written by older clients may carry nulls or miss columns; those read
/// as the column's empty value. The key is kept as the store returns it
/// (UUID string or bigint).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileRecord {
    #[schema(value_type = Object)]
    pub id: Value,
    /// Company name supplied with the upload
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_name: String,
    /// Size of the uploaded file in bytes
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: i64,
    /// MIME type declared by the client
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub content_type: String,
    /// Object key inside the storage bucket
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_path: String,
    /// Header row followed by every data row
    #[schema(value_type = Vec<Vec<Object>>)]
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Insert payload for the `files` table; `id` and `created_at` come from the store
#[derive(Debug, Clone, Serialize)]
pub struct NewFileRecord {
    pub name: String,
    pub original_name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub storage_path: String,
    pub content: Vec<Vec<Value>>,
    pub status: String,
    pub user_id: String,
}
