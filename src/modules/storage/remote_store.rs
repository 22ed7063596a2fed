//! Remote store abstraction
//!
//! The upload flow and the reporting tools talk to the managed backend only
//! through this trait, so tests can swap in an in-memory store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One table row as returned by the store, column order preserved
pub type Row = Map<String, Value>;

/// Remote store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The service answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from remote store: {0}")]
    UnexpectedResponse(String),

    #[error("Remote store configuration error: {0}")]
    Config(String),
}

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Sort direction for ordered selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Select query against a single table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    columns: Option<String>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// Select every column
    pub fn all() -> Self {
        Self::default()
    }

    /// Select a comma-separated list of columns, e.g. `"id, name"`
    pub fn columns(columns: &str) -> Self {
        let columns = columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            columns: Some(columns).filter(|c| !c.is_empty()),
            ..Self::default()
        }
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Selected column names, `None` meaning all columns
    pub fn selected_columns(&self) -> Option<Vec<&str>> {
        self.columns.as_deref().map(|c| c.split(',').collect())
    }

    pub fn ordering(&self) -> Option<(&str, Direction)> {
        self.order.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.limit
    }

    /// PostgREST query-string parameters for this query
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "select",
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        if let Some((column, direction)) = &self.order {
            params.push(("order", format!("{}.{}", column, direction.as_str())));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Managed table storage plus object storage
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Append one record and return the row as persisted (store-assigned fields included)
    async fn insert(&self, table: &str, record: Value) -> StoreResult<Row>;

    /// Append several records in one request; either all of them land or none do
    async fn insert_many(&self, table: &str, records: Vec<Value>) -> StoreResult<()>;

    /// Remove the rows whose `column` equals `value`
    async fn delete_where(&self, table: &str, column: &str, value: &str) -> StoreResult<()>;

    /// Write an object, replacing any existing object at the same key
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()>;

    /// Remove an object
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>>;

    /// All rows of a table, sorted by one column
    async fn list(&self, table: &str, order_by: &str, direction: Direction) -> StoreResult<Vec<Row>> {
        self.select(table, &Query::all().order(order_by, direction))
            .await
    }
}
