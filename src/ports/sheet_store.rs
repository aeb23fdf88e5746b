use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::schema::SheetRow;
use crate::error::InfrastructureError;

/// Handle to one worksheet of one spreadsheet.
#[async_trait::async_trait]
pub trait SheetStore: Send + Sync + Debug {
    /// Human readable name of the target, used in logs and health output.
    fn target(&self) -> String;

    /// Adds `row` after the last row of the worksheet. Does not read existing
    /// rows and does not retry.
    async fn append_row(&self, row: &SheetRow) -> error_stack::Result<(), InfrastructureError>;
}

/// Builds `SheetStore` handles: credentials, auth and target resolution.
#[async_trait::async_trait]
pub trait SheetConnector: Send + Sync + Debug {
    async fn connect(&self) -> error_stack::Result<Arc<dyn SheetStore>, InfrastructureError>;
}
