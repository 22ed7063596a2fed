use std::sync::Arc;

use tracing::debug;

use crate::modules::storage::{Direction, Query, RemoteStore, Row};

/// Outcome of sampling one table
#[derive(Debug, Clone, PartialEq)]
pub enum TableSample {
    Rows(Vec<Row>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInspection {
    pub table: String,
    pub sample: TableSample,
}

/// Uploaded projects plus the inventory listing, each fetched independently
#[derive(Debug)]
pub struct ProjectsReport {
    pub files_table: String,
    pub files: Result<Vec<Row>, String>,
    pub inventory: Result<Vec<Row>, String>,
}

pub struct TableReportService {
    store: Arc<dyn RemoteStore>,
}

impl TableReportService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Sample up to `limit` rows of each table. A failing table does not stop the others.
    pub async fn inspect_tables(&self, tables: &[String], limit: usize) -> Vec<TableInspection> {
        let mut inspections = Vec::with_capacity(tables.len());

        for table in tables {
            let sample = match self.store.select(table, &Query::all().limit(limit)).await {
                Ok(rows) => TableSample::Rows(rows),
                Err(e) => TableSample::Failed(e.to_string()),
            };
            inspections.push(TableInspection {
                table: table.clone(),
                sample,
            });
        }

        inspections
    }

    /// Probe each candidate not in `known` with a one-row select; return the ones that answer
    pub async fn discover_tables(&self, candidates: &[&str], known: &[String]) -> Vec<String> {
        let mut found = Vec::new();

        for candidate in candidates {
            if known.iter().any(|k| k == candidate) {
                continue;
            }
            match self.store.select(candidate, &Query::all().limit(1)).await {
                Ok(_) => found.push(candidate.to_string()),
                Err(e) => debug!("Table '{}' not reachable: {}", candidate, e),
            }
        }

        found
    }

    pub async fn list_projects(&self, files_table: &str, inventory_table: &str) -> ProjectsReport {
        let files = self
            .store
            .select(
                files_table,
                &Query::columns("id, name, original_name, created_at")
                    .order("created_at", Direction::Descending),
            )
            .await
            .map_err(|e| e.to_string());

        let inventory = self
            .store
            .select(
                inventory_table,
                &Query::columns("id, name, description, created_at")
                    .order("created_at", Direction::Descending),
            )
            .await
            .map_err(|e| e.to_string());

        ProjectsReport {
            files_table: files_table.to_string(),
            files,
            inventory,
        }
    }
}
