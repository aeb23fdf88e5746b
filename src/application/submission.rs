use std::sync::Arc;

use chrono::NaiveDateTime;
use error_stack::Report;
use strum::Display;
use tracing::{error, info, instrument, warn};

use crate::domain::request::{SubmissionRequest, ValidRequest};
use crate::domain::schema::{ColumnSchema, SheetRow};
use crate::domain::validation::{self, ValidationError, ValidationPolicy};
use crate::error::InfrastructureError;

use super::client_cache::SheetClientCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SubmissionState {
    Idle,
    Validating,
    Rejected,
    Persisting,
    Persisted,
    Failed,
}

/// Result of one submit action as handed to the presentation layer.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Rejected(ValidationError),
    Persisted { request: ValidRequest, row: SheetRow },
    Failed(Report<InfrastructureError>),
}

impl SubmissionOutcome {
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionOutcome::Rejected(_) => SubmissionState::Rejected,
            SubmissionOutcome::Persisted { .. } => SubmissionState::Persisted,
            SubmissionOutcome::Failed(_) => SubmissionState::Failed,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, SubmissionOutcome::Persisted { .. })
    }
}

/// Validates a request, turns it into a row and appends it. Holds no state
/// between submissions; every call starts from `Idle`.
#[derive(Debug)]
pub struct SubmissionHandler {
    clients: Arc<SheetClientCache>,
    schema: ColumnSchema,
    reject_past_departures: bool,
}

impl SubmissionHandler {
    pub fn new(
        clients: Arc<SheetClientCache>,
        schema: ColumnSchema,
        reject_past_departures: bool,
    ) -> Self {
        Self {
            clients,
            schema,
            reject_past_departures,
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub async fn submit(&self, request: SubmissionRequest) -> SubmissionOutcome {
        self.submit_at(request, chrono::Local::now().naive_local())
            .await
    }

    /// Runs one submission with `submitted_at` as the clock reading used for
    /// the timestamp column and the past-departure check.
    #[instrument(skip(self, request), fields(state = tracing::field::Empty))]
    pub async fn submit_at(
        &self,
        request: SubmissionRequest,
        submitted_at: NaiveDateTime,
    ) -> SubmissionOutcome {
        let span = tracing::Span::current();
        let transition = |state: SubmissionState| {
            span.record("state", tracing::field::display(state));
            tracing::debug!("submission -> {}", state);
        };

        transition(SubmissionState::Idle);
        transition(SubmissionState::Validating);

        let policy = if self.reject_past_departures {
            ValidationPolicy::not_before(submitted_at.date())
        } else {
            ValidationPolicy::default()
        };

        let valid = match validation::validate(request, &policy) {
            Ok(valid) => valid,
            Err(err) => {
                transition(SubmissionState::Rejected);
                warn!("Submission rejected: {}", err);
                return SubmissionOutcome::Rejected(err);
            }
        };

        transition(SubmissionState::Persisting);
        let row = self.schema.build_row(&valid, submitted_at);

        let store = match self.clients.get().await {
            Ok(store) => store,
            Err(report) => {
                transition(SubmissionState::Failed);
                error!("❌ Sheet client unavailable: {:?}", report);
                return SubmissionOutcome::Failed(report);
            }
        };

        match store.append_row(&row).await {
            Ok(()) => {
                transition(SubmissionState::Persisted);
                info!("✅ Appended {} to {}", row, store.target());
                SubmissionOutcome::Persisted {
                    request: valid,
                    row,
                }
            }
            Err(report) => {
                transition(SubmissionState::Failed);
                error!("❌ Append to {} failed: {:?}", store.target(), report);
                SubmissionOutcome::Failed(report)
            }
        }
    }
}
