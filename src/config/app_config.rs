use config::{Config, ConfigBuilder, FileFormat};
use error_stack::{report, ResultExt};
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use crate::domain::schema::ColumnSchema;

use super::form_config::FormConfig;
use super::logging_config::LoggingConfig;
use super::schema_config::SchemaConfig;
use super::sheets_config::SheetsConfig;

pub const DEFAULT_CONFIG_PATH: &str = "Config";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("[CONFIG ERROR] Error reading config '{0}'")]
    Read(String),
    #[error("[CONFIG ERROR] Failed to deserialize config '{origin}' at field path `{path}`")]
    Invalid { origin: String, path: String },
    #[error("[CONFIG ERROR] Invalid column schema in config '{0}'")]
    Schema(String),
    #[error("[CONFIG ERROR] Config '{0}' names neither `spreadsheet_id` nor `spreadsheet_name`")]
    MissingTarget(String),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads the file named by `CONFIG_PATH`, or `Config.{toml,json,...}`.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> error_stack::Result<Self, ConfigError> {
        let builder = Config::builder().add_source(config::File::with_name(config_path));
        Self::from_builder(builder, config_path)
    }

    pub fn from_toml_str(toml: &str) -> error_stack::Result<Self, ConfigError> {
        let builder = Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml));
        Self::from_builder(builder, "<inline>")
    }

    fn from_builder(
        builder: ConfigBuilder<config::builder::DefaultState>,
        origin: &str,
    ) -> error_stack::Result<Self, ConfigError> {
        let value = builder
            .build()
            .change_context_lazy(|| ConfigError::Read(origin.to_string()))?
            .try_deserialize::<serde_json::Value>()
            .change_context_lazy(|| ConfigError::Read(origin.to_string()))?;

        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        let config = match AppConfig::deserialize(path_de) {
            Ok(config) => config,
            Err(e) => {
                let path = track
                    .path()
                    .iter()
                    .map(|seg| match seg {
                        Segment::Seq { index } => format!("[{}]", index),
                        Segment::Map { key } => format!(".{}", key),
                        Segment::Enum { variant } => format!("::{}", variant),
                        Segment::Unknown => String::from("<?>"),
                    })
                    .collect::<String>();
                return Err(report!(ConfigError::Invalid {
                    origin: origin.to_string(),
                    path: path.trim_start_matches('.').to_string(),
                }))
                .attach_printable(e.to_string())
                .attach_printable(
                    "Make sure all required fields are present in the configuration file.",
                );
            }
        };

        if config.sheets.spreadsheet_id.is_none() && config.sheets.spreadsheet_name.is_none() {
            return Err(report!(ConfigError::MissingTarget(origin.to_string())));
        }

        config
            .column_schema()
            .change_context_lazy(|| ConfigError::Schema(origin.to_string()))?;

        Ok(config)
    }

    pub fn column_schema(
        &self,
    ) -> error_stack::Result<ColumnSchema, crate::domain::schema::SchemaError> {
        ColumnSchema::try_from(self.schema.clone()).map_err(|err| report!(err))
    }
}
