//! Inbound email ingestion: classify, extract, match, register.

pub mod carrier_resolver;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod registrar;
pub mod runner;

pub use carrier_resolver::{resolve_carrier, url_template};
pub use error::IngestError;
pub use matcher::match_order;
pub use outcome::{IngestOutcome, ParsedSummary, REASON_NOT_SHIPPING, REASON_NO_TRACKING};
pub use registrar::{OutcomeStatus, Registrar, TrackingOutcome};
pub use runner::IngestPipeline;
