mod table_report_service;

pub use table_report_service::{ProjectsReport, TableInspection, TableReportService, TableSample};
