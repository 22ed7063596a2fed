use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv_async::{AsyncReaderBuilder, StringRecord};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::cell::{empty_cell, header_text, infer_cell, is_empty_cell, spreadsheet_cell, unnamed_if_blank};

/// Supported upload formats, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xlsx,
    Xls,
}

impl TabularFormat {
    /// Case-insensitive lookup; `extension` excludes the leading dot
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(TabularFormat::Csv),
            "xlsx" => Some(TabularFormat::Xlsx),
            "xls" => Some(TabularFormat::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Xlsx => "xlsx",
            TabularFormat::Xls => "xls",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No columns to parse from file")]
    Empty,

    #[error("Error tokenizing data. Line {line}: expected {expected} fields, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error(transparent)]
    Csv(#[from] csv_async::Error),

    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet parser task failed: {0}")]
    Task(String),
}

/// Header row plus data rows; every row has exactly `headers.len()` cells
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ParsedTable {
    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header row followed by every data row
    pub fn into_content(self) -> Vec<Vec<Value>> {
        let header = self.headers.into_iter().map(Value::String).collect();
        std::iter::once(header).chain(self.rows).collect()
    }
}

/// Parse a staged upload. Spreadsheets are decoded on the blocking pool.
pub async fn parse_file(path: &Path, format: TabularFormat) -> Result<ParsedTable, ParseError> {
    let table = match format {
        TabularFormat::Csv => parse_csv(path).await?,
        TabularFormat::Xlsx | TabularFormat::Xls => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || parse_spreadsheet(&path))
                .await
                .map_err(|e| ParseError::Task(e.to_string()))??
        }
    };

    debug!(
        "Parsed {} file: {} columns, {} rows",
        format.extension(),
        table.headers.len(),
        table.row_count()
    );
    Ok(table)
}

async fn parse_csv(path: &Path) -> Result<ParsedTable, ParseError> {
    let file = tokio::fs::File::open(path).await?;
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(file);

    let header_record = reader.headers().await?;
    if header_record.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::Empty);
    }
    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(i, h)| unnamed_if_blank(h.trim().to_string(), i))
        .collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).await? {
        if record.len() > headers.len() {
            return Err(ParseError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: headers.len(),
                found: record.len(),
            });
        }

        let mut row: Vec<Value> = record.iter().map(infer_cell).collect();
        row.resize(headers.len(), empty_cell());
        rows.push(row);
    }

    Ok(ParsedTable { headers, rows })
}

fn parse_spreadsheet(path: &Path) -> Result<ParsedTable, ParseError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    table_from_range(&range)
}

/// First non-blank row is the header; trailing blank rows are dropped
fn table_from_range(range: &Range<Data>) -> Result<ParsedTable, ParseError> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|cell| is_empty_cell(&spreadsheet_cell(cell))));

    let header_row = rows.next().ok_or(ParseError::Empty)?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_text(cell, i))
        .collect();

    let mut data: Vec<Vec<Value>> = rows
        .map(|row| {
            let mut cells: Vec<Value> = row.iter().map(spreadsheet_cell).collect();
            cells.resize(headers.len(), empty_cell());
            cells
        })
        .collect();

    while data
        .last()
        .is_some_and(|row| row.iter().all(is_empty_cell))
    {
        data.pop();
    }

    Ok(ParsedTable {
        headers,
        rows: data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn csv_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(TabularFormat::from_extension("CSV"), Some(TabularFormat::Csv));
        assert_eq!(TabularFormat::from_extension("Xlsx"), Some(TabularFormat::Xlsx));
        assert_eq!(TabularFormat::from_extension("xls"), Some(TabularFormat::Xls));
        assert_eq!(TabularFormat::from_extension("pdf"), None);
    }

    #[tokio::test]
    async fn test_parse_csv_simple() {
        let file = csv_fixture("a,b\n1,2\n");

        let table = parse_file(file.path(), TabularFormat::Csv).await.unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.into_content(), vec![vec![json!("a"), json!("b")], vec![json!(1), json!(2)]]);
    }

    #[tokio::test]
    async fn test_parse_csv_fills_missing_cells() {
        let file = csv_fixture("sku,name,qty\nA1,,3\nA2,Tornillo\n\nA3,Tuerca,\n");

        let table = parse_file(file.path(), TabularFormat::Csv).await.unwrap();

        assert_eq!(table.headers, vec!["sku", "name", "qty"]);
        assert_eq!(
            table.rows,
            vec![
                vec![json!("A1"), json!(""), json!(3)],
                vec![json!("A2"), json!("Tornillo"), json!("")],
                vec![json!("A3"), json!("Tuerca"), json!("")],
            ]
        );
    }

    #[tokio::test]
    async fn test_parse_csv_quoted_fields() {
        let file = csv_fixture("name,notes\n\"Acme, Inc.\",\"line \"\"one\"\"\"\n");

        let table = parse_file(file.path(), TabularFormat::Csv).await.unwrap();

        assert_eq!(table.rows, vec![vec![json!("Acme, Inc."), json!("line \"one\"")]]);
    }

    #[tokio::test]
    async fn test_parse_csv_header_only() {
        let file = csv_fixture("a,b\n");

        let table = parse_file(file.path(), TabularFormat::Csv).await.unwrap();

        assert_eq!(table.row_count(), 0);
        assert_eq!(table.into_content(), vec![vec![json!("a"), json!("b")]]);
    }

    #[tokio::test]
    async fn test_parse_csv_empty_file_fails() {
        let file = csv_fixture("");

        let err = parse_file(file.path(), TabularFormat::Csv).await.unwrap_err();

        assert!(matches!(err, ParseError::Empty));
    }

    #[tokio::test]
    async fn test_parse_csv_rejects_rows_wider_than_header() {
        let file = csv_fixture("a,b\n1,2\n1,2,3\n");

        let err = parse_file(file.path(), TabularFormat::Csv).await.unwrap_err();

        match err {
            ParseError::RaggedRow {
                expected, found, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_spreadsheet_garbage_fails() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a workbook").unwrap();

        let result = parse_file(file.path(), TabularFormat::Xlsx).await;

        assert!(result.is_err());
    }

    fn workbook_fixture() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/inventario.xlsx")
    }

    #[tokio::test]
    async fn test_parse_xlsx_workbook() {
        let table = parse_file(&workbook_fixture(), TabularFormat::Xlsx)
            .await
            .unwrap();

        assert_eq!(table.headers, vec!["Producto", "Precio", "Cantidad"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows,
            vec![
                vec![json!("Martillo"), json!(12.5), json!(3)],
                vec![json!("Clavos"), json!(0.25), json!("")],
            ]
        );
    }

    #[test]
    fn test_table_from_range() {
        let mut range = Range::new((0, 0), (4, 2));
        // leading blank row
        range.set_value((1, 0), Data::String("producto".into()));
        range.set_value((1, 1), Data::String("precio".into()));
        range.set_value((2, 0), Data::String("Martillo".into()));
        range.set_value((2, 1), Data::Float(12.0));
        range.set_value((2, 2), Data::Bool(true));
        range.set_value((3, 0), Data::String("Clavos".into()));
        range.set_value((3, 1), Data::Float(0.5));

        let table = table_from_range(&range).unwrap();

        assert_eq!(table.headers, vec!["producto", "precio", "Unnamed: 2"]);
        assert_eq!(
            table.rows,
            vec![
                vec![json!("Martillo"), json!(12), json!(true)],
                vec![json!("Clavos"), json!(0.5), json!("")],
            ]
        );
    }

    #[test]
    fn test_table_from_blank_range_fails() {
        let range: Range<Data> = Range::new((0, 0), (1, 1));

        assert!(matches!(table_from_range(&range), Err(ParseError::Empty)));
    }
}
