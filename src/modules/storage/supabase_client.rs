//! Supabase REST client
//!
//! Tables go through PostgREST (`/rest/v1`), objects through the Storage
//! API (`/storage/v1`). Every request carries the project key both as
//! `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::config::SupabaseConfig;
use crate::modules::storage::remote_store::{Query, RemoteStore, Row, StoreError, StoreResult};

pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> StoreResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Supabase client initialized for {}", config.url);

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    /// Object URL with every key segment percent-encoded
    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            encoded_key
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Turn a non-success response into `StoreError::Api` with the service's message
    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| format!("Remote store returned HTTP {}", status)),
        })
    }
}

/// Extract the human-readable message from a PostgREST or Storage error body
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let message = serde_json::from_str::<Value>(trimmed).ok().and_then(|json| {
        ["message", "error_description", "error", "msg"]
            .iter()
            .find_map(|field| json.get(*field).and_then(Value::as_str).map(str::to_string))
    });

    Some(message.unwrap_or_else(|| trimmed.to_string()))
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn insert(&self, table: &str, record: Value) -> StoreResult<Row> {
        let response = self
            .authorized(self.http_client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        let rows: Vec<Row> = Self::check(response).await?.json().await?;
        debug!("Inserted {} row(s) into '{}'", rows.len(), table);

        rows.into_iter().next().ok_or_else(|| {
            StoreError::UnexpectedResponse(format!(
                "insert into '{}' returned no representation",
                table
            ))
        })
    }

    async fn insert_many(&self, table: &str, records: Vec<Value>) -> StoreResult<()> {
        let count = records.len();
        let response = self
            .authorized(self.http_client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&records)
            .send()
            .await?;

        Self::check(response).await?;
        debug!("Inserted {} row(s) into '{}'", count, table);
        Ok(())
    }

    async fn delete_where(&self, table: &str, column: &str, value: &str) -> StoreResult<()> {
        let response = self
            .authorized(self.http_client.delete(self.table_url(table)))
            .query(&[(column, format!("eq.{}", value))])
            .send()
            .await?;

        Self::check(response).await?;
        debug!("Deleted rows of '{}' where {} = {}", table, column, value);
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()> {
        let size = data.len();
        let response = self
            .authorized(self.http_client.post(self.object_url(bucket, key)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await?;

        Self::check(response).await?;
        debug!("Uploaded object '{}' ({} bytes) to bucket '{}'", key, size, bucket);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let response = self
            .authorized(self.http_client.delete(self.object_url(bucket, key)))
            .send()
            .await?;

        Self::check(response).await?;
        debug!("Deleted object '{}' from bucket '{}'", key, bucket);
        Ok(())
    }

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        let response = self
            .authorized(self.http_client.get(self.table_url(table)))
            .query(&query.to_params())
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
