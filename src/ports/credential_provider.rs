use std::collections::BTreeMap;
use std::fmt::Debug;

use error_stack::{report, ResultExt};
use serde_json::Value;
use thiserror::Error;

/// Keys a service account bundle must carry.
pub const REQUIRED_CREDENTIAL_FIELDS: [&str; 7] = [
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
    "client_id",
    "client_x509_cert_url",
];

/// Optional keys and the values Google issues by default.
pub const DEFAULT_CREDENTIAL_FIELDS: [(&str, &str); 3] = [
    ("auth_uri", "https://accounts.google.com/o/oauth2/auth"),
    ("token_uri", "https://oauth2.googleapis.com/token"),
    (
        "auth_provider_x509_cert_url",
        "https://www.googleapis.com/oauth2/v1/certs",
    ),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("missing credential field `{0}`")]
    MissingField(String),
    #[error("could not read credentials from {0}")]
    Unreadable(String),
    #[error("credential bundle is not a JSON object")]
    NotAnObject,
}

/// Named fields of a service account identity.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    fields: BTreeMap<String, String>,
}

impl Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("client_email", &self.get("client_email"))
            .field("project_id", &self.get("project_id"))
            .finish_non_exhaustive()
    }
}

impl CredentialBundle {
    /// Builds a bundle, failing on the first required key that is absent or
    /// blank. Optional keys missing from `fields` get Google's defaults.
    pub fn from_fields(
        fields: BTreeMap<String, String>,
    ) -> error_stack::Result<Self, CredentialError> {
        if let Some(missing) = REQUIRED_CREDENTIAL_FIELDS
            .iter()
            .find(|key| fields.get(**key).map_or(true, |value| value.trim().is_empty()))
        {
            return Err(report!(CredentialError::MissingField(missing.to_string())));
        }

        let mut fields = fields;
        for (key, default) in DEFAULT_CREDENTIAL_FIELDS {
            fields
                .entry(key.to_string())
                .or_insert_with(|| default.to_string());
        }
        Ok(Self { fields })
    }

    /// Parses the JSON key file format issued by Google Cloud.
    pub fn from_json(json: &str) -> error_stack::Result<Self, CredentialError> {
        let value: Value = serde_json::from_str(json)
            .change_context(CredentialError::Unreadable("JSON bundle".to_string()))?;

        let Value::Object(object) = value else {
            return Err(report!(CredentialError::NotAnObject));
        };

        let fields = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                Value::Null => None,
                other => Some((key, other.to_string())),
            })
            .collect();

        Self::from_fields(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Serializes the bundle back into the key file JSON shape.
    pub fn to_json(&self) -> String {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        )
        .to_string()
    }
}

/// Source of the service account identity used by the sheet client.
pub trait CredentialProvider: Send + Sync + Debug {
    fn credentials(&self) -> error_stack::Result<CredentialBundle, CredentialError>;
}
