use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::schema::SheetRow;

pub trait ValueRangeFactory {
    fn from_row(row: &SheetRow) -> Self;
}

fn wrap_value<T: AsRef<str>>(value: T) -> Value {
    Value::String(value.as_ref().to_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_row(row: &SheetRow) -> Self {
        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![row.values().iter().map(wrap_value).collect()]),
        }
    }
}

/// Cells of the first row of a value range, stringified.
pub fn first_row(value_range: ValueRange) -> Vec<String> {
    value_range
        .values
        .and_then(|rows| rows.into_iter().next())
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}
