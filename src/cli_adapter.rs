use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use error_stack::{report, ResultExt};
use tracing::{error, info, instrument};
use vehicle_request::application::client_cache::SheetClientCache;
use vehicle_request::application::submission::{SubmissionHandler, SubmissionOutcome};
use vehicle_request::domain::choices::{Choice, Purpose, Status, PURPOSE_PLACEHOLDER, STATUS_PLACEHOLDER};
use vehicle_request::domain::request::{FormInput, SubmissionRequest, ValidRequest};
use vehicle_request::domain::schema::SheetRow;
use vehicle_request::ports::command_handler::{Command, CommandError, CommandHandler};

pub const FORM_INCOMPLETE_MESSAGE: &str = "Please complete all form fields correctly.";
pub const RESUBMIT_MESSAGE: &str = "The request was not saved. Please submit it again.";

#[derive(Parser, Debug)]
#[command(
    name = "vehicle-request",
    about = "Vehicle-use request form backed by a Google spreadsheet"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Validate a request and append it to the worksheet
    Submit {
        /// Applicant name
        #[arg(long, default_value = "")]
        name: String,
        /// Employee ID number
        #[arg(long = "id", default_value = "")]
        id_number: String,
        #[arg(long, default_value = "")]
        department: String,
        /// One of the options listed by `options`
        #[arg(long, default_value = STATUS_PLACEHOLDER)]
        status: String,
        /// One of the options listed by `options`
        #[arg(long, default_value = PURPOSE_PLACEHOLDER)]
        purpose: String,
        /// Departure date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the accepted status and purpose values
    Options,
    /// Connect to the worksheet and report the target
    Health,
}

impl Cli {
    pub fn into_command(self, today: NaiveDate) -> Command {
        match self.command {
            CliCommand::Submit {
                name,
                id_number,
                department,
                status,
                purpose,
                date,
            } => Command::Submit(FormInput {
                name,
                id_number,
                department,
                status,
                purpose,
                departure_date: date.unwrap_or(today),
            }),
            CliCommand::Options => Command::ListOptions,
            CliCommand::Health => Command::HealthCheck,
        }
    }
}

fn render_choice_list(title: &str, options: &[&str]) -> String {
    let mut output = format!("{}:\n", title);
    for (index, option) in options.iter().enumerate() {
        if index == 0 {
            output.push_str(&format!("  ({})\n", option));
        } else {
            output.push_str(&format!("  - {}\n", option));
        }
    }
    output
}

pub fn render_options() -> String {
    format!(
        "{}{}",
        render_choice_list("Status", &Status::ui_options()),
        render_choice_list("Purpose", &Purpose::ui_options())
    )
}

pub fn render_summary(request: &ValidRequest, row: &SheetRow) -> String {
    format!(
        "✅ Request submitted!\n\
         Summary of the processed data:\n\
         \x20 * Name: {}\n\
         \x20 * ID Number: {}\n\
         \x20 * Department: {}\n\
         \x20 * Status: {}\n\
         \x20 * Purpose: {}\n\
         \x20 * Departure: {}\n\
         Stored row: {}",
        request.name(),
        request.id_number(),
        request.department(),
        request.status(),
        request.purpose(),
        request.departure_date().format("%d %B %Y"),
        row
    )
}

pub struct CliAdapter {
    handler: Arc<SubmissionHandler>,
    clients: Arc<SheetClientCache>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("clients", &self.clients)
            .finish_non_exhaustive()
    }
}

impl CliAdapter {
    pub fn new(handler: Arc<SubmissionHandler>, clients: Arc<SheetClientCache>) -> Self {
        Self { handler, clients }
    }

    #[instrument(skip(command))]
    pub async fn run(&self, command: Command) -> error_stack::Result<(), CommandError> {
        match self.handle(command).await {
            Ok(output) => {
                println!("{}", output);
                info!("Command completed");
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                eprintln!("❌ {}", report.current_context());
                Err(report)
            }
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument(skip(command))]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::Submit(form) => {
                let request = SubmissionRequest::from_form(form);
                match self.handler.submit(request).await {
                    SubmissionOutcome::Persisted { request, row } => {
                        Ok(render_summary(&request, &row))
                    }
                    SubmissionOutcome::Rejected(err) => Err(report!(CommandError::Rejected {
                        details: format!("{} ({})", FORM_INCOMPLETE_MESSAGE, err),
                    })),
                    SubmissionOutcome::Failed(report) => {
                        let details = format!("{} ({})", RESUBMIT_MESSAGE, report.current_context());
                        Err(report.change_context(CommandError::ExecutionFailed { details }))
                    }
                }
            }
            Command::ListOptions => Ok(render_options()),
            Command::HealthCheck => {
                let store = self.clients.get().await.change_context_lazy(|| {
                    CommandError::ExecutionFailed {
                        details: "Health check failed".to_string(),
                    }
                })?;
                Ok(format!(
                    "🟢 Vehicle request service - Healthy\nTarget: {}\nClient TTL: {}s",
                    store.target(),
                    self.clients.ttl().as_secs()
                ))
            }
        }
    }
}
