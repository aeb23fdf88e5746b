use error_stack::ResultExt;
use google_drive3::DriveHub;
use tracing::instrument;

use crate::error::InfrastructureError;

use super::auth::SheetsAuthenticator;
use super::http_client::{HttpClient, HttpsConnector};

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Drive query matching non-trashed spreadsheets with exactly this title.
pub fn spreadsheet_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME_TYPE
    )
}

/// Finds a spreadsheet id by its title. Only used when no id is configured,
/// since titles are neither unique nor stable.
pub struct SpreadsheetLocator {
    hub: DriveHub<HttpsConnector>,
}

impl std::fmt::Debug for SpreadsheetLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadsheetLocator").finish_non_exhaustive()
    }
}

impl SpreadsheetLocator {
    pub fn new(client: HttpClient, auth: SheetsAuthenticator) -> Self {
        Self {
            hub: DriveHub::new(client, auth),
        }
    }

    #[instrument]
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<String, InfrastructureError> {
        let (_, file_list) = self
            .hub
            .files()
            .list()
            .q(&spreadsheet_name_query(name))
            .param("fields", "files(id,name)")
            .page_size(10)
            .include_items_from_all_drives(true)
            .supports_all_drives(true)
            .doit()
            .await
            .change_context_lazy(|| InfrastructureError::SpreadsheetNotFound(name.to_string()))
            .attach_printable("Drive lookup by spreadsheet name failed")?;

        let files = file_list.files.unwrap_or_default();
        if files.len() > 1 {
            tracing::warn!(
                "{} spreadsheets are named '{}', using the first one; configure spreadsheet_id to pick one explicitly",
                files.len(),
                name
            );
        }

        files
            .into_iter()
            .find_map(|file| file.id)
            .ok_or_else(|| {
                error_stack::report!(InfrastructureError::SpreadsheetNotFound(name.to_string()))
            })
            .attach_printable_lazy(|| format!("no spreadsheet named '{}' is shared with the service account", name))
    }
}
