mod cli_adapter;

use std::sync::Arc;

use clap::Parser;
use error_stack::ResultExt;
use thiserror::Error;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};
use vehicle_request::adapters::credentials::ConfigCredentialProvider;
use vehicle_request::adapters::sheets::sheet_client::GoogleSheetConnector;
use vehicle_request::application::client_cache::SheetClientCache;
use vehicle_request::application::submission::SubmissionHandler;
use vehicle_request::config::app_config::AppConfig;
use vehicle_request::config::logging_config::LoggingConfig;
use vehicle_request::ports::command_handler::Command;
use vehicle_request::prettyprint::PrettyFormatter;

use cli_adapter::{Cli, CliAdapter};

#[derive(Error, Debug)]
enum AppError {
    #[error("failed to load configuration")]
    Config,
    #[error("failed to set up logging")]
    Logging,
    #[error("could not connect to the destination worksheet")]
    Startup,
    #[error("command failed")]
    Command,
}

#[tokio::main]
async fn main() -> error_stack::Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli.into_command(chrono::Local::now().date_naive());

    if let Command::ListOptions = command {
        println!("{}", cli_adapter::render_options());
        return Ok(());
    }

    let config = AppConfig::load().change_context(AppError::Config)?;
    setup_tracing(&config.logging)?;
    setup_panic_hook();

    run(config, command).await
}

#[instrument(skip(config, command))]
async fn run(config: AppConfig, command: Command) -> error_stack::Result<(), AppError> {
    info!("Starting vehicle-request");

    let schema = config.column_schema().change_context(AppError::Config)?;
    let credentials = Arc::new(ConfigCredentialProvider::new(
        config.sheets.credentials.clone(),
    ));
    let connector = Arc::new(GoogleSheetConnector::new(
        config.sheets.clone(),
        schema.clone(),
        credentials,
    ));
    let clients = Arc::new(SheetClientCache::new(connector, config.sheets.cache_ttl()));

    if command.requires_connection() {
        // Construction failures end the session before any form input is used.
        clients.warm().await.change_context(AppError::Startup)?;
    }

    let handler = Arc::new(SubmissionHandler::new(
        Arc::clone(&clients),
        schema,
        config.form.reject_past_departures,
    ));
    let cli_adapter = CliAdapter::new(handler, clients);

    cli_adapter
        .run(command)
        .await
        .change_context(AppError::Command)
}

fn setup_tracing(logging: &LoggingConfig) -> error_stack::Result<(), AppError> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = match &logging.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(
                    std::fs::File::create(&**path)
                        .change_context(AppError::Logging)
                        .attach_printable_lazy(|| format!("cannot create log file '{}'", path))?,
                )
                .with_ansi(false),
        ),
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("vehicle_request", tracing::Level::from(logging.level)),
        )
        .with(log_file_layer)
        .with(stderr_layer)
        .try_init()
        .change_context(AppError::Logging)
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
