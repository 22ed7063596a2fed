use calamine::Data;
use serde_json::{Number, Value};

/// Spellings read as a missing value, matching common spreadsheet exports
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Largest magnitude at which every integer is exactly representable as f64
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// The value stored for a missing cell
pub fn empty_cell() -> Value {
    Value::String(String::new())
}

pub(crate) fn is_empty_cell(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Infer a scalar from raw CSV text: integer, then float, then boolean, else text.
pub fn infer_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
        return empty_cell();
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }

    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }

    match trimmed {
        "True" | "TRUE" | "true" => Value::Bool(true),
        "False" | "FALSE" | "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Spreadsheets store every number as a float; whole numbers come back as integers.
pub(crate) fn float_cell(float: f64) -> Value {
    if float.fract() == 0.0 && float.abs() < MAX_EXACT_FLOAT_INT {
        return Value::from(float as i64);
    }
    Number::from_f64(float)
        .map(Value::Number)
        .unwrap_or_else(empty_cell)
}

pub(crate) fn spreadsheet_cell(data: &Data) -> Value {
    match data {
        Data::Int(int) => Value::from(*int),
        Data::Float(float) => float_cell(*float),
        Data::Bool(flag) => Value::Bool(*flag),
        Data::String(text) => {
            if text.trim().is_empty() || NA_MARKERS.contains(&text.trim()) {
                empty_cell()
            } else {
                Value::String(text.clone())
            }
        }
        Data::DateTime(datetime) => datetime
            .as_datetime()
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or_else(|| float_cell(datetime.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Value::String(text.clone()),
        Data::Error(_) | Data::Empty => empty_cell(),
    }
}

/// Header text for a spreadsheet cell; unnamed columns get a positional name
pub(crate) fn header_text(data: &Data, index: usize) -> String {
    let text = match data {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => match spreadsheet_cell(other) {
            Value::String(text) => text,
            value => value.to_string(),
        },
    };
    unnamed_if_blank(text, index)
}

pub(crate) fn unnamed_if_blank(text: String, index: usize) -> String {
    if text.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        text
    }
}
