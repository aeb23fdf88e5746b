use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use strum::Display;
use thiserror::Error;

use super::choices::Choice;
use super::request::ValidRequest;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One column of the destination worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Name,
    IdNumber,
    Department,
    Status,
    Purpose,
    DepartureDate,
    SubmittedAt,
}

impl Column {
    /// Header label expected in the first row of the worksheet.
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::IdNumber => "ID Number",
            Column::Department => "Department",
            Column::Status => "Status",
            Column::Purpose => "Purpose",
            Column::DepartureDate => "Departure Date",
            Column::SubmittedAt => "Submitted At",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `DD-MM-YYYY`
    DayFirst,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::DayFirst => "%d-%m-%Y",
        }
    }

    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column schema must contain at least one column")]
    Empty,
    #[error("column `{0}` appears more than once in the schema")]
    DuplicateColumn(Column),
}

/// Stringified cells of one worksheet row, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow(Vec<String>);

impl SheetRow {
    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}

impl std::fmt::Display for SheetRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(" | "))
    }
}

/// Column order agreed with the destination sheet's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<Column>,
    date_format: DateFormat,
}

impl ColumnSchema {
    pub const DEFAULT_COLUMNS: [Column; 6] = [
        Column::Name,
        Column::IdNumber,
        Column::Department,
        Column::Status,
        Column::Purpose,
        Column::DepartureDate,
    ];

    pub fn new(columns: Vec<Column>, date_format: DateFormat) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (index, column) in columns.iter().enumerate() {
            if columns[..index].contains(column) {
                return Err(SchemaError::DuplicateColumn(*column));
            }
        }
        Ok(Self {
            columns,
            date_format,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn date_format(&self) -> DateFormat {
        self.date_format
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn includes_timestamp(&self) -> bool {
        self.columns.contains(&Column::SubmittedAt)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.header()).collect()
    }

    /// Compares a worksheet header row against the schema, ignoring case and
    /// surrounding whitespace. Trailing empty cells are ignored.
    pub fn matches_header(&self, header: &[String]) -> bool {
        let trimmed = header
            .iter()
            .map(|cell| cell.trim())
            .collect::<Vec<_>>();
        let significant = trimmed
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |last| last + 1);

        significant == self.columns.len()
            && self
                .columns
                .iter()
                .zip(&trimmed)
                .all(|(column, cell)| column.header().eq_ignore_ascii_case(cell))
    }

    pub fn build_row(&self, request: &ValidRequest, submitted_at: NaiveDateTime) -> SheetRow {
        let cells = self
            .columns
            .iter()
            .map(|column| match column {
                Column::Name => request.name().to_string(),
                Column::IdNumber => request.id_number().to_string(),
                Column::Department => request.department().to_string(),
                Column::Status => request.status().label().to_string(),
                Column::Purpose => request.purpose().label().to_string(),
                Column::DepartureDate => self.date_format.format(request.departure_date()),
                Column::SubmittedAt => submitted_at.format(TIMESTAMP_FORMAT).to_string(),
            })
            .collect();
        SheetRow(cells)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            columns: Self::DEFAULT_COLUMNS.to_vec(),
            date_format: DateFormat::Iso,
        }
    }
}
