//! Tabular file parsing
//!
//! Turns uploaded CSV and Excel files into a header row plus same-length
//! data rows of scalar JSON cells.

mod cell;
mod parser;

pub use cell::{empty_cell, infer_cell};
pub use parser::{parse_file, ParseError, ParsedTable, TabularFormat};
