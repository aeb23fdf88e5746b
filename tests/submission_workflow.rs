use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use error_stack::{report, ResultExt};
use vehicle_request::domain::choices::{Purpose, Status, STATUS_PLACEHOLDER};
use vehicle_request::domain::schema::{Column, ColumnSchema, DateFormat, SheetRow};
use vehicle_request::domain::validation::Field;
use vehicle_request::ports::sheet_store::{SheetConnector, SheetStore};
use vehicle_request::{
    FormInput, InfrastructureError, SheetClientCache, SubmissionHandler, SubmissionOutcome,
    SubmissionRequest, SubmissionState, ValidationError,
};

#[derive(Debug, Default)]
struct RecordingStore {
    rows: Mutex<Vec<Vec<String>>>,
    attempts: AtomicUsize,
    fail_appends: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Default::default()
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().expect("rows mutex").clone()
    }
}

#[async_trait::async_trait]
impl SheetStore for RecordingStore {
    fn target(&self) -> String {
        "recording store".to_string()
    }

    async fn append_row(&self, row: &SheetRow) -> error_stack::Result<(), InfrastructureError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends {
            return Err(report!(InfrastructureError::Append))
                .attach_printable("simulated transport error: connection reset");
        }
        self.rows
            .lock()
            .expect("rows mutex")
            .push(row.values().to_vec());
        Ok(())
    }
}

#[derive(Debug)]
struct FakeConnector {
    store: Arc<RecordingStore>,
    connects: AtomicUsize,
    /// Connects after this many successful ones are refused.
    refuse_after: Option<usize>,
}

impl FakeConnector {
    fn new(store: Arc<RecordingStore>) -> Self {
        Self {
            store,
            connects: AtomicUsize::new(0),
            refuse_after: None,
        }
    }
}

#[async_trait::async_trait]
impl SheetConnector for FakeConnector {
    async fn connect(&self) -> error_stack::Result<Arc<dyn SheetStore>, InfrastructureError> {
        let previous = self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_after.is_some_and(|limit| previous >= limit) {
            return Err(report!(InfrastructureError::Auth))
                .attach_printable("service account key was revoked");
        }
        let store: Arc<dyn SheetStore> = self.store.clone();
        Ok(store)
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn submitted_at() -> NaiveDateTime {
    date(2024, 4, 20)
        .and_hms_opt(8, 30, 0)
        .expect("valid timestamp")
}

fn ada() -> SubmissionRequest {
    SubmissionRequest {
        name: "Ada".to_string(),
        id_number: "123".to_string(),
        department: "Ops".to_string(),
        status: Some(Status::Employee),
        purpose: Some(Purpose::ClinicVisit),
        departure_date: date(2024, 5, 1),
    }
}

struct Harness {
    store: Arc<RecordingStore>,
    connector: Arc<FakeConnector>,
    handler: SubmissionHandler,
}

fn harness_with(store: RecordingStore, schema: ColumnSchema) -> Harness {
    let store = Arc::new(store);
    let connector = Arc::new(FakeConnector::new(store.clone()));
    let cache = Arc::new(SheetClientCache::with_default_ttl(connector.clone()));
    Harness {
        store,
        connector,
        handler: SubmissionHandler::new(cache, schema, true),
    }
}

fn harness() -> Harness {
    harness_with(RecordingStore::default(), ColumnSchema::default())
}

#[tokio::test]
async fn blank_id_is_rejected_without_touching_the_store() {
    let h = harness();
    let mut request = ada();
    request.id_number = String::new();

    let outcome = h.handler.submit_at(request, submitted_at()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::MissingField { ref fields })
            if fields == &vec![Field::IdNumber]
    ));
    assert_eq!(outcome.state(), SubmissionState::Rejected);
    assert_eq!(h.store.attempts.load(Ordering::SeqCst), 0);
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn placeholder_status_is_unselected_choice() {
    let h = harness();
    let form = FormInput {
        name: "Ada".to_string(),
        id_number: "123".to_string(),
        department: "Ops".to_string(),
        status: STATUS_PLACEHOLDER.to_string(),
        purpose: "Clinic Visit".to_string(),
        departure_date: date(2024, 5, 1),
    };

    let outcome = h
        .handler
        .submit_at(SubmissionRequest::from_form(form), submitted_at())
        .await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::UnselectedChoice { ref fields })
            if fields == &vec![Field::Status]
    ));
    assert!(h.store.rows().is_empty());
}

#[tokio::test]
async fn valid_request_appends_exactly_one_row() {
    let h = harness();

    let outcome = h.handler.submit_at(ada(), submitted_at()).await;

    let SubmissionOutcome::Persisted { request, row } = outcome else {
        panic!("expected the request to be persisted");
    };
    assert_eq!(request.name(), "Ada");
    assert_eq!(
        row.values(),
        ["Ada", "123", "Ops", "Employee", "Clinic Visit", "2024-05-01"]
    );
    assert_eq!(h.store.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.rows(), vec![row.into_values()]);
}

#[tokio::test]
async fn timestamp_column_is_appended_when_configured() {
    let mut columns = ColumnSchema::DEFAULT_COLUMNS.to_vec();
    columns.push(Column::SubmittedAt);
    let schema = ColumnSchema::new(columns, DateFormat::DayFirst).expect("valid schema");
    let h = harness_with(RecordingStore::default(), schema.clone());

    let outcome = h.handler.submit_at(ada(), submitted_at()).await;

    assert!(outcome.is_persisted());
    let rows = h.store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), schema.len());
    assert_eq!(
        rows[0],
        vec![
            "Ada",
            "123",
            "Ops",
            "Employee",
            "Clinic Visit",
            "01-05-2024",
            "2024-04-20 08:30:00"
        ]
    );
}

#[tokio::test]
async fn append_failure_is_reported_once_without_retry() {
    let h = harness_with(RecordingStore::failing(), ColumnSchema::default());

    let outcome = h.handler.submit_at(ada(), submitted_at()).await;

    let SubmissionOutcome::Failed(report) = outcome else {
        panic!("expected the append to fail");
    };
    assert_eq!(report.current_context(), &InfrastructureError::Append);
    assert!(format!("{report:?}").contains("connection reset"));
    assert_eq!(h.store.attempts.load(Ordering::SeqCst), 1);
    assert!(h.store.rows().is_empty());
}

#[tokio::test]
async fn duplicate_submissions_store_duplicate_rows() {
    let h = harness();

    assert!(h.handler.submit_at(ada(), submitted_at()).await.is_persisted());
    assert!(h.handler.submit_at(ada(), submitted_at()).await.is_persisted());

    let rows = h.store.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], rows[1]);
}

#[tokio::test]
async fn client_is_constructed_once_across_submissions() {
    let h = harness();

    for _ in 0..10 {
        assert!(h.handler.submit_at(ada(), submitted_at()).await.is_persisted());
    }

    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.rows().len(), 10);
}

#[tokio::test]
async fn past_departure_is_rejected_when_enabled() {
    let h = harness();
    let after_departure = date(2024, 5, 2)
        .and_hms_opt(9, 0, 0)
        .expect("valid timestamp");

    let outcome = h.handler.submit_at(ada(), after_departure).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::DepartureInPast { .. })
    ));
    assert_eq!(h.store.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn past_departure_is_accepted_when_disabled() {
    let store = Arc::new(RecordingStore::default());
    let connector = Arc::new(FakeConnector::new(store.clone()));
    let cache = Arc::new(SheetClientCache::with_default_ttl(connector));
    let handler = SubmissionHandler::new(cache, ColumnSchema::default(), false);
    let after_departure = date(2024, 6, 1)
        .and_hms_opt(9, 0, 0)
        .expect("valid timestamp");

    assert!(handler.submit_at(ada(), after_departure).await.is_persisted());
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn failed_client_refresh_fails_the_submission() {
    let store = Arc::new(RecordingStore::default());
    let connector = Arc::new(FakeConnector {
        refuse_after: Some(1),
        ..FakeConnector::new(store.clone())
    });
    let cache = Arc::new(SheetClientCache::new(connector.clone(), Duration::ZERO));
    let handler = SubmissionHandler::new(cache, ColumnSchema::default(), true);

    assert!(handler.submit_at(ada(), submitted_at()).await.is_persisted());
    let outcome = handler.submit_at(ada(), submitted_at()).await;

    assert_eq!(outcome.state(), SubmissionState::Failed);
    let SubmissionOutcome::Failed(report) = outcome else {
        panic!("expected the refresh to fail");
    };
    assert_eq!(report.current_context(), &InfrastructureError::Auth);
    assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(store.rows().len(), 1);
}
