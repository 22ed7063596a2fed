use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Inventory column for a header: lowercased, whitespace runs as `_`
pub fn inventory_key(header: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&header.to_lowercase(), "_")
        .into_owned()
}

/// One `inventory` row per data row of `content` (header row first), linked to
/// the file record and its owner. A repeated key keeps the rightmost cell.
pub fn inventory_items(content: &[Vec<Value>], file_id: &Value, user_id: &str) -> Vec<Value> {
    let Some((header, rows)) = content.split_first() else {
        return Vec::new();
    };
    let keys: Vec<String> = header
        .iter()
        .map(|cell| match cell {
            Value::String(text) => inventory_key(text),
            other => inventory_key(&other.to_string()),
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut item: Map<String, Value> = keys.iter().cloned().zip(row.iter().cloned()).collect();
            item.insert("file_id".to_string(), file_id.clone());
            item.insert("user_id".to_string(), Value::String(user_id.to_string()));
            Value::Object(item)
        })
        .collect()
}
