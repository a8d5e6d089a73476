pub mod broadcast;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod sanitize;
pub mod secrets;
pub mod webhook;

pub use broadcast::{NoopNotifier, TrackingBroadcaster, TrackingEvent, TrackingNotifier};
pub use classifier::ShippingClassifier;
pub use config::{load_config, Config};
pub use db::Database;
pub use error::{ConfigError, Result, ShiptrackError};
pub use extractor::{CarrierDescriptor, Confidence, ParseResult, TrackingExtractor};
pub use ingest::{IngestError, IngestOutcome, IngestPipeline, TrackingOutcome};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use webhook::{verify_signature, InboundEmailPayload, SignatureError};
