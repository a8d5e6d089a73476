//! Test harness for isolated ingestion runs.
//!
//! Each `TestHarness` owns its own database (in-memory, or a file in a
//! temporary directory) and records every published tracking event.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use shiptrack::broadcast::NotifyError;
use shiptrack::config::Config;
use shiptrack::db::order_repo::{self, OrderRow};
use shiptrack::db::{carrier_repo, tracking_repo};
use shiptrack::{
    Database, InboundEmailPayload, IngestOutcome, IngestPipeline, TrackingEvent, TrackingNotifier,
};

/// Notifier that keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<TrackingEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TrackingNotifier for RecordingNotifier {
    fn publish(&self, event: TrackingEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Notifier that always fails.
pub struct FailingNotifier;

impl TrackingNotifier for FailingNotifier {
    fn publish(&self, _event: TrackingEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Publish("listener unavailable".to_string()))
    }
}

pub struct TestHarness {
    /// Keeps the database directory alive for file-backed harnesses.
    _temp_dir: Option<TempDir>,
    pub db: Database,
    pub notifier: Arc<RecordingNotifier>,
    pub pipeline: IngestPipeline,
}

impl TestHarness {
    /// In-memory database with the default config.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let db = Database::open_in_memory().expect("Failed to create test database");
        Self::build(config, db, None)
    }

    /// File-backed database in a fresh temporary directory.
    pub fn file_backed() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(&temp_dir.path().join("data").join("shiptrack.db"))
            .expect("Failed to open file database");
        Self::build(&Config::default(), db, Some(temp_dir))
    }

    fn build(config: &Config, db: Database, temp_dir: Option<TempDir>) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = IngestPipeline::from_config(config, db.clone(), notifier.clone())
            .expect("Failed to build pipeline");
        Self {
            _temp_dir: temp_dir,
            db,
            notifier,
            pipeline,
        }
    }

    /// Replaces the notifier, e.g. with one that fails.
    pub fn with_notifier(mut self, notifier: Arc<dyn TrackingNotifier>) -> Self {
        self.pipeline = IngestPipeline::new(
            self.db.clone(),
            Config::default().build_classifier(),
            Config::default()
                .build_extractor()
                .expect("Failed to build extractor"),
            notifier,
        );
        self
    }

    pub fn seed_order(&self, workspace_id: &str, order_number: &str) -> OrderRow {
        let order = OrderRow::new(workspace_id, order_number);
        order_repo::insert(&self.db, &order).expect("Failed to insert order");
        order
    }

    pub fn ingest(&self, payload: &InboundEmailPayload) -> IngestOutcome {
        self.pipeline.process(payload).expect("Ingest failed")
    }

    pub fn tracking_count(&self) -> u64 {
        tracking_repo::count(&self.db).unwrap()
    }

    pub fn carrier_count(&self) -> u64 {
        carrier_repo::count(&self.db).unwrap()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.notifier.events()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
