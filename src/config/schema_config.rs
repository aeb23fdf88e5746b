use serde::Deserialize;

use crate::domain::schema::{Column, ColumnSchema, DateFormat, SchemaError};

fn default_columns() -> Vec<Column> {
    ColumnSchema::DEFAULT_COLUMNS.to_vec()
}

/// Column layout of the destination worksheet. Must match its header row.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub date_format: DateFormat,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            date_format: DateFormat::default(),
        }
    }
}

impl TryFrom<SchemaConfig> for ColumnSchema {
    type Error = SchemaError;

    fn try_from(config: SchemaConfig) -> Result<Self, Self::Error> {
        ColumnSchema::new(config.columns, config.date_format)
    }
}
