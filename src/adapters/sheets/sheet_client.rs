use std::sync::Arc;

use error_stack::{report, Report, ResultExt};
use google_sheets4::{api::ValueRange, oauth2, Error as Sheets4Error, Sheets};
use tracing::instrument;

use crate::config::sheets_config::{SheetsConfig, ValueInputOption};
use crate::domain::schema::{ColumnSchema, SheetRow};
use crate::error::InfrastructureError;
use crate::ports::credential_provider::CredentialProvider;
use crate::ports::sheet_store::{SheetConnector, SheetStore};

use super::{
    auth,
    http_client::{self, HttpsConnector},
    spreadsheet_locator::SpreadsheetLocator,
    value_range_factory::{self, ValueRangeFactory},
};

/// A1 range covering a whole worksheet; single quotes in the title are doubled.
pub fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn header_range(worksheet: &str) -> String {
    format!("{}!1:1", worksheet_range(worksheet))
}

/// Whether a token could not be fetched because the token endpoint was
/// unreachable, as opposed to the service account being refused.
fn is_token_endpoint_unreachable(error: &Sheets4Error) -> bool {
    let Sheets4Error::MissingToken(inner) = error else {
        return false;
    };
    matches!(
        inner.downcast_ref::<oauth2::Error>(),
        Some(oauth2::Error::HttpError(_) | oauth2::Error::LowLevelError(_))
    )
}

/// Whether a failed call means the service account was rejected rather
/// than the resource being absent.
fn is_auth_failure(error: &Sheets4Error) -> bool {
    match error {
        Sheets4Error::MissingToken(_) => !is_token_endpoint_unreachable(error),
        Sheets4Error::BadRequest(body) => matches!(
            body.pointer("/error/code").and_then(serde_json::Value::as_u64),
            Some(401 | 403)
        ),
        Sheets4Error::Failure(response) => {
            matches!(response.status().as_u16(), 401 | 403)
        }
        _ => false,
    }
}

/// Maps a failed Sheets call to `Connection` or `Auth` when it is one of
/// those, and to `otherwise` for everything else.
fn remote_error(error: Sheets4Error, otherwise: InfrastructureError) -> Report<InfrastructureError> {
    let context = if is_token_endpoint_unreachable(&error) {
        InfrastructureError::Connection
    } else if is_auth_failure(&error) {
        InfrastructureError::Auth
    } else {
        otherwise
    };
    Report::new(error).change_context(context)
}

fn lookup_error(error: Sheets4Error, spreadsheet_id: &str) -> Report<InfrastructureError> {
    remote_error(
        error,
        InfrastructureError::SpreadsheetNotFound(spreadsheet_id.to_string()),
    )
    .attach_printable(format!("Failed to fetch spreadsheet '{}'", spreadsheet_id))
}

fn header_read_error(error: Sheets4Error, worksheet: &str) -> Report<InfrastructureError> {
    remote_error(error, InfrastructureError::HeaderMismatch(worksheet.to_string()))
        .attach_printable(format!("Failed to read the header row of '{}'", worksheet))
}

/// Handle to one worksheet of one Google spreadsheet.
pub struct GoogleSheetClient {
    hub: Sheets<HttpsConnector>,
    spreadsheet_id: String,
    worksheet: String,
    value_input_option: ValueInputOption,
}

impl std::fmt::Debug for GoogleSheetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GoogleSheetClient {{ spreadsheet_id: {:?}, worksheet: {:?} }}",
            self.spreadsheet_id, self.worksheet
        )
    }
}

impl GoogleSheetClient {
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Confirms the spreadsheet is reachable and holds the worksheet.
    #[instrument]
    async fn resolve_worksheet(&self) -> error_stack::Result<(), InfrastructureError> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .param("fields", "spreadsheetId,sheets.properties(sheetId,title)")
            .doit()
            .await
            .map_err(|err| lookup_error(err, &self.spreadsheet_id))?;

        let found = spreadsheet
            .sheets
            .unwrap_or_default()
            .iter()
            .filter_map(|sheet| sheet.properties.as_ref())
            .any(|props| props.title.as_deref() == Some(self.worksheet.as_str()));

        if !found {
            return Err(report!(InfrastructureError::WorksheetNotFound(
                self.worksheet.clone()
            )))
            .attach_printable_lazy(|| {
                format!("spreadsheet '{}' has no such tab", self.spreadsheet_id)
            });
        }
        Ok(())
    }

    #[instrument]
    pub async fn read_header(&self) -> error_stack::Result<Vec<String>, InfrastructureError> {
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &header_range(&self.worksheet))
            .doit()
            .await
            .map_err(|err| header_read_error(err, &self.worksheet))?;

        Ok(value_range_factory::first_row(value_range))
    }

    #[instrument]
    async fn verify_header(&self, schema: &ColumnSchema) -> error_stack::Result<(), InfrastructureError> {
        let header = self.read_header().await?;
        if schema.matches_header(&header) {
            return Ok(());
        }
        Err(report!(InfrastructureError::HeaderMismatch(
            self.worksheet.clone()
        )))
        .attach_printable(format!(
            "expected {:?}, found {:?}",
            schema.headers(),
            header
        ))
    }
}

#[async_trait::async_trait]
impl SheetStore for GoogleSheetClient {
    fn target(&self) -> String {
        format!(
            "worksheet '{}' of spreadsheet '{}'",
            self.worksheet, self.spreadsheet_id
        )
    }

    #[instrument(skip(row), fields(cells = row.len()))]
    async fn append_row(&self, row: &SheetRow) -> error_stack::Result<(), InfrastructureError> {
        let range = worksheet_range(&self.worksheet);
        self.hub
            .spreadsheets()
            .values_append(ValueRange::from_row(row), &self.spreadsheet_id, &range)
            .value_input_option(self.value_input_option.as_api_str())
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .map(|_| ())
            .change_context(InfrastructureError::Append)
            .attach_printable_lazy(|| format!("Failed to append {} to range {}", row, range))
    }
}

/// Builds `GoogleSheetClient`s from configuration: credentials, auth, then
/// spreadsheet and worksheet resolution.
pub struct GoogleSheetConnector {
    config: SheetsConfig,
    schema: ColumnSchema,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for GoogleSheetConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GoogleSheetConnector {{ target: {}, worksheet: {:?} }}",
            self.config.target_description(),
            self.config.worksheet
        )
    }
}

impl GoogleSheetConnector {
    pub fn new(
        config: SheetsConfig,
        schema: ColumnSchema,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            schema,
            credentials,
        }
    }

    #[instrument(name = "GoogleSheetConnector::build_client")]
    pub async fn build_client(&self) -> error_stack::Result<GoogleSheetClient, InfrastructureError> {
        let bundle = self.credentials.credentials().map_err(|report| {
            let detail = report.current_context().to_string();
            report.change_context(InfrastructureError::Credential(detail))
        })?;

        let client = http_client::http_client()?;
        let auth = auth::auth(&bundle, client.clone()).await?;

        let spreadsheet_id = match (&self.config.spreadsheet_id, &self.config.spreadsheet_name) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => {
                SpreadsheetLocator::new(client.clone(), auth.clone())
                    .find_by_name(name)
                    .await?
            }
            (None, None) => {
                return Err(report!(InfrastructureError::SpreadsheetNotFound(
                    "neither spreadsheet_id nor spreadsheet_name is configured".to_string()
                )))
            }
        };

        let sheet_client = GoogleSheetClient {
            hub: Sheets::new(client, auth),
            spreadsheet_id,
            worksheet: self.config.worksheet.to_string(),
            value_input_option: self.config.value_input_option,
        };

        sheet_client.resolve_worksheet().await?;
        if self.config.verify_header {
            sheet_client.verify_header(&self.schema).await?;
        }

        tracing::info!("Connected to {}", sheet_client.target());
        Ok(sheet_client)
    }
}

#[async_trait::async_trait]
impl SheetConnector for GoogleSheetConnector {
    async fn connect(&self) -> error_stack::Result<Arc<dyn SheetStore>, InfrastructureError> {
        let client = self.build_client().await?;
        Ok(Arc::new(client))
    }
}
