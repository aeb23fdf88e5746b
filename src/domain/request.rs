use chrono::NaiveDate;

use super::choices::{Choice, Purpose, Status};

/// Raw values as they come out of the form inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub id_number: String,
    pub department: String,
    pub status: String,
    pub purpose: String,
    pub departure_date: NaiveDate,
}

/// One vehicle-use request. Built fresh for every submission and never
/// compared by identity: submitting the same request twice stores two rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub id_number: String,
    pub department: String,
    pub status: Option<Status>,
    pub purpose: Option<Purpose>,
    pub departure_date: NaiveDate,
}

impl SubmissionRequest {
    pub fn from_form(form: FormInput) -> Self {
        Self {
            status: Status::from_ui(&form.status),
            purpose: Purpose::from_ui(&form.purpose),
            name: form.name,
            id_number: form.id_number,
            department: form.department,
            departure_date: form.departure_date,
        }
    }
}

impl From<FormInput> for SubmissionRequest {
    fn from(form: FormInput) -> Self {
        Self::from_form(form)
    }
}

/// A request that passed validation. Only `validation::validate` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    name: String,
    id_number: String,
    department: String,
    status: Status,
    purpose: Purpose,
    departure_date: NaiveDate,
}

impl ValidRequest {
    pub(super) fn new(
        name: String,
        id_number: String,
        department: String,
        status: Status,
        purpose: Purpose,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            name,
            id_number,
            department,
            status,
            purpose,
            departure_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_number(&self) -> &str {
        &self.id_number
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn into_request(self) -> SubmissionRequest {
        SubmissionRequest {
            name: self.name,
            id_number: self.id_number,
            department: self.department,
            status: Some(self.status),
            purpose: Some(self.purpose),
            departure_date: self.departure_date,
        }
    }
}
