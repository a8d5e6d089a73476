use serde::{Deserialize, Serialize};

use crate::extractor::Confidence;

use super::registrar::TrackingOutcome;

pub const REASON_NOT_SHIPPING: &str = "Not a shipping email";
pub const REASON_NO_TRACKING: &str = "No tracking numbers found";

/// Summary of what the extractor found, echoed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSummary {
    pub sender: String,
    pub subject: String,
    pub confidence: Confidence,
    pub tracking_count: usize,
    pub order_references: Vec<String>,
}

/// Terminal result of processing one inbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Skipped {
        reason: String,
    },
    Processed {
        parsed: ParsedSummary,
        results: Vec<TrackingOutcome>,
    },
}

impl IngestOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, IngestOutcome::Skipped { .. })
    }
}
