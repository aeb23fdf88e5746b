use chrono::NaiveDate;
use strum::Display;
use thiserror::Error;

use super::request::{SubmissionRequest, ValidRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Field {
    #[strum(to_string = "applicant name")]
    Name,
    #[strum(to_string = "ID number")]
    IdNumber,
    #[strum(to_string = "department")]
    Department,
    #[strum(to_string = "status")]
    Status,
    #[strum(to_string = "purpose")]
    Purpose,
    #[strum(to_string = "departure date")]
    DepartureDate,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// User-correctable problems with a submission. No I/O happens once one of
/// these is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field(s): {}", join_fields(.fields))]
    MissingField { fields: Vec<Field> },
    #[error("no option selected for: {}", join_fields(.fields))]
    UnselectedChoice { fields: Vec<Field> },
    #[error("departure date {date} is before {earliest}")]
    DepartureInPast { date: NaiveDate, earliest: NaiveDate },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Departures before this date are rejected. `None` accepts any date.
    pub earliest_departure: Option<NaiveDate>,
}

impl ValidationPolicy {
    pub fn not_before(date: NaiveDate) -> Self {
        Self {
            earliest_departure: Some(date),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks that every field is concretely set.
///
/// Blank text fields win over unselected choices, which win over the date
/// policy; each error lists every field in its category.
pub fn validate(
    request: SubmissionRequest,
    policy: &ValidationPolicy,
) -> Result<ValidRequest, ValidationError> {
    let missing = [
        (Field::Name, request.name.as_str()),
        (Field::IdNumber, request.id_number.as_str()),
        (Field::Department, request.department.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(field, _)| field)
    .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(ValidationError::MissingField { fields: missing });
    }

    let (status, purpose) = match (request.status, request.purpose) {
        (Some(status), Some(purpose)) => (status, purpose),
        (status, purpose) => {
            let mut fields = Vec::new();
            if status.is_none() {
                fields.push(Field::Status);
            }
            if purpose.is_none() {
                fields.push(Field::Purpose);
            }
            return Err(ValidationError::UnselectedChoice { fields });
        }
    };

    if let Some(earliest) = policy.earliest_departure {
        if request.departure_date < earliest {
            return Err(ValidationError::DepartureInPast {
                date: request.departure_date,
                earliest,
            });
        }
    }

    Ok(ValidRequest::new(
        request.name,
        request.id_number,
        request.department,
        status,
        purpose,
        request.departure_date,
    ))
}
