use lazy_static::lazy_static;
use regex::Regex;

use crate::modules::tabular::TabularFormat;

lazy_static! {
    /// Runs of whitespace, replaced by a single underscore
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Anything outside the portable filename set
    /// - Kept: "Inventario_2024.xlsx", "datos-v2.csv"
    /// - Dropped: "/", "\", ":", "ñ", "é", "*"
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Lowercase extension after the last dot, if any
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// The tabular format of an allowed filename, `None` for anything else
pub fn tabular_format(filename: &str) -> Option<TabularFormat> {
    file_extension(filename).and_then(|ext| TabularFormat::from_extension(&ext))
}

/// Whether the filename carries an allowed extension (csv, xlsx, xls)
pub fn allowed_file(filename: &str) -> bool {
    tabular_format(filename).is_some()
}

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Directory components are dropped, whitespace becomes `_`, characters
/// outside `[A-Za-z0-9_.-]` are removed and leading/trailing `._` trimmed.
/// Returns an empty string when nothing usable remains.
pub fn secure_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let underscored = WHITESPACE_REGEX.replace_all(base, "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&underscored, "");

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}
