use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SheetsConfig {
    /// Opaque spreadsheet id. Preferred over `spreadsheet_name` when both are set.
    #[serde(default)]
    pub spreadsheet_id: Option<Box<str>>,
    /// Title looked up through Drive when no id is configured.
    #[serde(default)]
    pub spreadsheet_name: Option<Box<str>>,
    pub worksheet: Box<str>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub verify_header: bool,
    #[serde(default)]
    pub value_input_option: ValueInputOption,
    pub credentials: CredentialSource,
}

impl SheetsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Description of the target used in log lines and error messages.
    pub fn target_description(&self) -> String {
        match (&self.spreadsheet_id, &self.spreadsheet_name) {
            (Some(id), _) => format!("spreadsheet id '{}'", id),
            (None, Some(name)) => format!("spreadsheet named '{}'", name),
            (None, None) => "unconfigured spreadsheet".to_string(),
        }
    }
}

/// How the Sheets API interprets appended values.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueInputOption {
    /// Stored as typed; keeps leading zeros in ID numbers.
    #[default]
    Raw,
    /// Parsed as if typed into the UI.
    UserEntered,
}

impl ValueInputOption {
    pub fn as_api_str(self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Service account JSON key file on disk.
    File { path: Box<str> },
    /// The whole JSON key stored under one config entry.
    Bundle { json: Box<str> },
    /// Individual key fields, e.g. `[sheets.credentials.fields]`.
    Fields { fields: BTreeMap<String, String> },
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::File { path } => {
                f.debug_struct("File").field("path", path).finish()
            }
            CredentialSource::Bundle { .. } => f.debug_struct("Bundle").finish_non_exhaustive(),
            CredentialSource::Fields { fields } => f
                .debug_struct("Fields")
                .field("keys", &fields.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}
