use thiserror::Error;

/// Failures talking to the credential source or the remote spreadsheet.
///
/// Anything raised while connecting is fatal for the session; `Append` is
/// reported per submission and the user may resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfrastructureError {
    #[error("credentials unavailable: {0}")]
    Credential(String),
    #[error("authentication with the sheets service failed")]
    Auth,
    #[error("could not reach the sheets service")]
    Connection,
    #[error("spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),
    #[error("worksheet `{0}` not found in the spreadsheet")]
    WorksheetNotFound(String),
    #[error("header row of worksheet `{0}` does not match the configured columns")]
    HeaderMismatch(String),
    #[error("failed to append row to the worksheet")]
    Append,
}

impl InfrastructureError {
    /// Whether the error happened while building the client rather than while
    /// appending with an already built one.
    pub fn is_construction_failure(&self) -> bool {
        !matches!(self, InfrastructureError::Append)
    }
}
