use error_stack::ResultExt;
use tracing::instrument;

use crate::config::sheets_config::CredentialSource;
use crate::ports::credential_provider::{CredentialBundle, CredentialError, CredentialProvider};

/// Resolves the service account bundle from the `[sheets.credentials]` section.
#[derive(Debug, Clone)]
pub struct ConfigCredentialProvider {
    source: CredentialSource,
}

impl ConfigCredentialProvider {
    pub fn new(source: CredentialSource) -> Self {
        Self { source }
    }
}

impl CredentialProvider for ConfigCredentialProvider {
    #[instrument(name = "ConfigCredentialProvider::credentials")]
    fn credentials(&self) -> error_stack::Result<CredentialBundle, CredentialError> {
        match &self.source {
            CredentialSource::Fields { fields } => CredentialBundle::from_fields(fields.clone()),
            CredentialSource::Bundle { json } => CredentialBundle::from_json(json),
            CredentialSource::File { path } => {
                let contents = std::fs::read_to_string(&**path)
                    .change_context_lazy(|| CredentialError::Unreadable(path.to_string()))
                    .attach_printable(
                        "Please provide a valid service account private key to enable Google Sheets integration.",
                    )?;
                CredentialBundle::from_json(&contents)
                    .attach_printable_lazy(|| format!("while reading key file '{}'", path))
            }
        }
    }
}
