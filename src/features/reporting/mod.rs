//! Diagnostic reports over the remote store.
//!
//! Backs the `inspect-tables` and `list-projects` binaries: sampling known
//! tables, probing for guessed table names and listing uploaded projects.

pub mod render;
pub mod services;

pub use services::{ProjectsReport, TableInspection, TableReportService, TableSample};
