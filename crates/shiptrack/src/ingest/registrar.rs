//! Persists tracking candidates against matched orders.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::broadcast::{ReviewStatus, TrackingEvent, TrackingIngested, TrackingNotifier};
use crate::db::carrier_repo;
use crate::db::order_repo::{self, OrderRow};
use crate::db::tracking_repo::{self, NewTracking, TrackingRow};
use crate::db::{Database, DatabaseError, Resolved};
use crate::extractor::{Confidence, TrackingCandidate};

use super::carrier_resolver::resolve_carrier;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A new record was stored and auto-approved.
    Created,
    /// The tracking number was already stored; nothing changed.
    Updated,
    /// Needs an operator: low confidence, or no order/carrier to bind to.
    PendingReview,
}

/// Per-candidate result reported back to the webhook caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingOutcome {
    pub tracking_number: String,
    /// Carrier display name.
    pub carrier: Option<String>,
    pub order_id: Option<String>,
    pub status: OutcomeStatus,
}

pub struct Registrar<'a> {
    db: &'a Database,
    notifier: &'a dyn TrackingNotifier,
}

impl<'a> Registrar<'a> {
    pub fn new(db: &'a Database, notifier: &'a dyn TrackingNotifier) -> Self {
        Self { db, notifier }
    }

    /// Registers one candidate.
    ///
    /// Every candidate with a detected carrier gets its carrier row, even
    /// when no order matched. A record is only written when both an order
    /// and a carrier are known. Storage errors propagate; notification
    /// failures are logged and swallowed.
    pub fn register(
        &self,
        candidate: &TrackingCandidate,
        order: Option<&OrderRow>,
        confidence: Confidence,
    ) -> Result<TrackingOutcome, DatabaseError> {
        let number = candidate.tracking_number.as_str();

        if let Some(existing) = tracking_repo::find_by_number(self.db, number)? {
            debug!("Tracking number {} already registered", number);
            return self.already_registered(existing);
        }

        self.bind(candidate, order, confidence)
    }

    /// Resolves the carrier and, with an order, inserts the record.
    fn bind(
        &self,
        candidate: &TrackingCandidate,
        order: Option<&OrderRow>,
        confidence: Confidence,
    ) -> Result<TrackingOutcome, DatabaseError> {
        let number = candidate.tracking_number.as_str();

        let carrier = match candidate.carrier.as_ref() {
            Some(descriptor) => {
                let tracking_url = descriptor.tracking_url(number);
                let carrier = resolve_carrier(self.db, descriptor, &tracking_url, number)?;
                Some((carrier.into_inner(), tracking_url))
            }
            None => None,
        };

        let (Some(order), Some((carrier, tracking_url))) = (order, carrier.as_ref()) else {
            debug!(
                "Tracking number {} needs review (order: {}, carrier: {})",
                number,
                order.is_some(),
                carrier.is_some()
            );
            return Ok(TrackingOutcome {
                tracking_number: number.to_string(),
                carrier: carrier.as_ref().map(|(row, _)| row.name.clone()),
                order_id: None,
                status: OutcomeStatus::PendingReview,
            });
        };

        let record = match tracking_repo::insert_or_fetch(
            self.db,
            &NewTracking {
                order_id: &order.id,
                carrier_id: &carrier.id,
                tracking_number: number,
            },
        )? {
            Resolved::Created(record) => record,
            Resolved::Existing(record) => {
                // Another request stored this number between lookup and insert
                debug!("Tracking number {} registered concurrently", number);
                return self.already_registered(record);
            }
        };

        order_repo::set_tracking(self.db, &order.id, number, Some(tracking_url.as_str()))?;

        let (status, review_status) = match confidence {
            Confidence::High => (OutcomeStatus::Created, ReviewStatus::Approved),
            Confidence::Low => (OutcomeStatus::PendingReview, ReviewStatus::PendingReview),
        };

        info!(
            "Registered tracking {} ({}) for order {}",
            number, carrier.name, order.order_number
        );

        let event = TrackingEvent::ingested(
            &order.workspace_id,
            TrackingIngested {
                tracking_id: record.id.clone(),
                tracking_number: number.to_string(),
                carrier_name: carrier.name.clone(),
                order_id: order.id.clone(),
                review_status,
            },
        );
        if let Err(e) = self.notifier.publish(event) {
            warn!("Failed to publish tracking event for {}: {}", number, e);
        }

        Ok(TrackingOutcome {
            tracking_number: number.to_string(),
            carrier: Some(carrier.name.clone()),
            order_id: Some(order.id.clone()),
            status,
        })
    }

    /// Reports a stored record as it is, with the carrier it was stored under.
    fn already_registered(&self, record: TrackingRow) -> Result<TrackingOutcome, DatabaseError> {
        let carrier = carrier_repo::find_by_id(self.db, &record.carrier_id)?;
        Ok(TrackingOutcome {
            tracking_number: record.tracking_number,
            carrier: carrier.map(|c| c.name),
            order_id: Some(record.order_id),
            status: OutcomeStatus::Updated,
        })
    }
}
