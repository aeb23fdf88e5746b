// Public API exports
pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod prettyprint;

// Re-export key types for easy access
pub use application::client_cache::SheetClientCache;
pub use application::submission::{SubmissionHandler, SubmissionOutcome, SubmissionState};
pub use domain::request::{FormInput, SubmissionRequest, ValidRequest};
pub use domain::schema::{ColumnSchema, SheetRow};
pub use domain::validation::{validate, ValidationError, ValidationPolicy};
pub use error::InfrastructureError;
