//! Plain-text rendering of the diagnostic reports

use std::fmt::Write;

use serde_json::Value;

use crate::features::reporting::{ProjectsReport, TableInspection, TableSample};
use crate::modules::storage::Row;
use crate::shared::constants::MAX_REPORT_VALUE_CHARS;

/// Display a cell; text longer than the report limit is cut and marked with `...`
pub fn truncate_value(value: &Value) -> String {
    match value {
        Value::String(text) if text.chars().count() > MAX_REPORT_VALUE_CHARS => {
            let cut: String = text.chars().take(MAX_REPORT_VALUE_CHARS).collect();
            format!("{}...", cut)
        }
        other => display_value(other),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn field(row: &Row, column: &str) -> String {
    row.get(column).map(display_value).unwrap_or_default()
}

pub fn render_inspections(inspections: &[TableInspection]) -> String {
    let mut out = String::from("\n=== TABLAS ENCONTRADAS ===\n");

    for inspection in inspections {
        match &inspection.sample {
            TableSample::Failed(message) => {
                let _ = writeln!(
                    out,
                    "\nError al consultar tabla '{}': {}",
                    inspection.table, message
                );
            }
            TableSample::Rows(rows) => {
                let _ = writeln!(out, "\nTABLA: {}", inspection.table.to_uppercase());
                let Some(first) = rows.first() else {
                    out.push_str("  [Tabla vacía - no hay datos para mostrar]\n");
                    continue;
                };

                let _ = writeln!(out, "\nColumnas ({}):", first.len());
                for column in first.keys() {
                    let _ = writeln!(out, "  - {}", column);
                }

                let _ = writeln!(out, "\nMuestra de datos ({} filas):", rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let _ = writeln!(out, "\nFila {}:", i + 1);
                    for (key, value) in row {
                        let _ = writeln!(out, "  {}: {}", key, truncate_value(value));
                    }
                }
            }
        }
    }

    out
}

pub fn render_discovery(found: &[String]) -> String {
    let mut out = String::from("\n\n=== BUSCANDO TABLAS ADICIONALES ===\n");
    for table in found {
        let _ = writeln!(out, "Encontrada tabla adicional: {}", table);
    }
    out
}

pub fn render_projects(report: &ProjectsReport) -> String {
    let mut out = String::from("\n===== PROYECTOS DEL CENTRO DE DATOS =====\n\n");

    match &report.files {
        Ok(projects) if !projects.is_empty() => {
            let _ = writeln!(out, "Proyectos encontrados: {}\n", projects.len());
            for (i, project) in projects.iter().enumerate() {
                let _ = writeln!(out, "{}. Nombre: {}", i + 1, field(project, "name"));
                let _ = writeln!(out, "   Archivo original: {}", field(project, "original_name"));
                let _ = writeln!(out, "   Fecha de creación: {}", field(project, "created_at"));
                out.push('\n');
            }
        }
        Ok(_) => {
            let _ = writeln!(
                out,
                "No se encontraron proyectos en la tabla '{}'.",
                report.files_table
            );
        }
        Err(message) => {
            let _ = writeln!(out, "Error al consultar proyectos: {}", message);
        }
    }

    match &report.inventory {
        Ok(items) if !items.is_empty() => {
            out.push_str("\n===== INVENTARIO =====\n\n");
            let _ = writeln!(out, "Elementos en inventario: {}\n", items.len());
            for (i, item) in items.iter().enumerate() {
                let _ = writeln!(out, "{}. Nombre: {}", i + 1, field(item, "name"));
                let description = item
                    .get("description")
                    .filter(|value| !value.is_null() && value.as_str() != Some(""));
                if let Some(description) = description {
                    let _ = writeln!(out, "   Descripción: {}", display_value(description));
                }
                let _ = writeln!(out, "   Fecha de registro: {}", field(item, "created_at"));
                out.push('\n');
            }
        }
        Ok(_) => {}
        Err(_) => {
            out.push_str("Nota: La tabla de inventario está vacía o no accesible.\n");
        }
    }

    out.push_str("\n===== FIN DEL REPORTE =====\n");
    out
}
