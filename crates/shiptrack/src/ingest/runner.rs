use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::broadcast::TrackingNotifier;
use crate::classifier::ShippingClassifier;
use crate::config::Config;
use crate::db::webhook_event_repo::{self, WebhookEventRow, WebhookEventStatus};
use crate::db::{Database, DatabaseError};
use crate::error::{ConfigError, ShiptrackError};
use crate::extractor::TrackingExtractor;
use crate::sanitize;
use crate::webhook::InboundEmailPayload;

use super::error::IngestError;
use super::matcher::match_order;
use super::outcome::{IngestOutcome, ParsedSummary, REASON_NOT_SHIPPING, REASON_NO_TRACKING};
use super::registrar::{Registrar, TrackingOutcome};

/// Provider tag stored on audit rows.
const PROVIDER: &str = "inbound-email";

pub struct IngestPipeline {
    db: Database,
    classifier: ShippingClassifier,
    extractor: TrackingExtractor,
    notifier: Arc<dyn TrackingNotifier>,
}

impl IngestPipeline {
    pub fn new(
        db: Database,
        classifier: ShippingClassifier,
        extractor: TrackingExtractor,
        notifier: Arc<dyn TrackingNotifier>,
    ) -> Self {
        Self {
            db,
            classifier,
            extractor,
            notifier,
        }
    }

    /// Production constructor: classifier and carrier table come from config.
    pub fn from_config(
        config: &Config,
        db: Database,
        notifier: Arc<dyn TrackingNotifier>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            db,
            config.build_classifier(),
            config.build_extractor()?,
            notifier,
        ))
    }

    /// Opens the configured database (running migrations) and builds the
    /// pipeline over it.
    pub fn open(config: &Config, notifier: Arc<dyn TrackingNotifier>) -> crate::Result<Self> {
        let path = config
            .database_path()
            .ok_or(ShiptrackError::NoDatabasePath)?;
        let db = Database::open(&path)?;
        Ok(Self::from_config(config, db, notifier)?)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Processes a payload, storing its JSON re-serialization for audit.
    pub fn process(&self, payload: &InboundEmailPayload) -> Result<IngestOutcome, IngestError> {
        let raw = serde_json::to_string(payload)?;
        self.process_raw(payload, &raw)
    }

    /// Processes a payload, storing `raw_payload` verbatim for audit.
    ///
    /// The audit row starts `pending` and receives exactly one terminal
    /// write. A storage error aborts the request and leaves the row where
    /// it was.
    pub fn process_raw(
        &self,
        payload: &InboundEmailPayload,
        raw_payload: &str,
    ) -> Result<IngestOutcome, IngestError> {
        let sender = sanitize::redact_email(&payload.from);
        let message_id = payload
            .message_id()
            .map(sanitize::hash_value)
            .unwrap_or_else(|| "none".to_string());
        let _ingest_span = info_span!("ingest",
            sender = %sender,
            message_id = %message_id,
        )
        .entered();

        // Step 1: Record the event
        let event = {
            let _step = info_span!("record_event").entered();
            let event = WebhookEventRow::pending(
                PROVIDER,
                &payload.from,
                &payload.subject,
                payload.message_id(),
                raw_payload,
            );
            webhook_event_repo::insert(&self.db, &event)?;
            event
        };

        // Step 2: Classify
        {
            let _step = info_span!("classify").entered();
            if !self
                .classifier
                .is_shipping_email(&payload.from, &payload.subject)
            {
                return self.skip(&event.id, REASON_NOT_SHIPPING);
            }
        }

        // Step 3: Extract
        let parsed = {
            let _step = info_span!("extract").entered();
            let body = payload.body_text();
            self.extractor
                .extract(&payload.from, &payload.subject, &body)
        };

        let candidates = parsed.unique_candidates();
        if candidates.is_empty() {
            return self.skip(&event.id, REASON_NO_TRACKING);
        }

        // Step 4: Match order
        let order = {
            let _step = info_span!("match_order").entered();
            match_order(&self.db, &parsed.order_references)?
        };

        // Step 5: Register candidates one at a time so carriers created
        // by an earlier candidate are reused by later ones
        let results = {
            let _step = info_span!("register",
                candidates = candidates.len(),
                confidence = ?parsed.confidence,
            )
            .entered();
            let registrar = Registrar::new(&self.db, self.notifier.as_ref());
            candidates
                .iter()
                .map(|candidate| registrar.register(candidate, order.as_ref(), parsed.confidence))
                .collect::<Result<Vec<TrackingOutcome>, DatabaseError>>()?
        };

        // Step 6: Finish
        webhook_event_repo::finish(
            &self.db,
            &event.id,
            WebhookEventStatus::Processed,
            None,
            Some(&results),
        )?;

        info!(
            "Processed shipping email: {} tracking number(s), order matched: {}",
            results.len(),
            order.is_some()
        );

        Ok(IngestOutcome::Processed {
            parsed: ParsedSummary {
                sender: payload.from.clone(),
                subject: payload.subject.clone(),
                confidence: parsed.confidence,
                tracking_count: candidates.len(),
                order_references: parsed.order_references.clone(),
            },
            results,
        })
    }

    fn skip(&self, event_id: &str, reason: &str) -> Result<IngestOutcome, IngestError> {
        debug!("Skipping webhook event: {}", reason);
        webhook_event_repo::finish::<()>(
            &self.db,
            event_id,
            WebhookEventStatus::Skipped,
            Some(reason),
            None,
        )?;
        Ok(IngestOutcome::Skipped {
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::NoopNotifier;
    use crate::db::order_repo::{self, OrderRow};

    fn pipeline() -> IngestPipeline {
        let db = Database::open_in_memory().unwrap();
        IngestPipeline::new(
            db,
            ShippingClassifier::default(),
            TrackingExtractor::default(),
            Arc::new(NoopNotifier),
        )
    }

    fn payload(from: &str, subject: &str, text: &str) -> InboundEmailPayload {
        InboundEmailPayload {
            from: from.to_string(),
            subject: subject.to_string(),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_not_shipping_is_skipped() {
        let pipeline = pipeline();
        let outcome = pipeline
            .process(&payload("friend@example.com", "Lunch?", "See you at noon"))
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Skipped {
                reason: REASON_NOT_SHIPPING.to_string()
            }
        );

        let db = pipeline.database();
        assert_eq!(
            webhook_event_repo::count_by_status(db, WebhookEventStatus::Skipped).unwrap(),
            1
        );
        assert_eq!(
            webhook_event_repo::count_by_status(db, WebhookEventStatus::Pending).unwrap(),
            0
        );
    }

    #[test]
    fn test_no_tracking_is_skipped() {
        let pipeline = pipeline();
        let outcome = pipeline
            .process(&payload("noreply@ups.com", "Your order has shipped", "Thanks!"))
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Skipped {
                reason: REASON_NO_TRACKING.to_string()
            }
        );
    }

    #[test]
    fn test_processed_row_stores_results() {
        let pipeline = pipeline();
        let order = OrderRow::new("ws-1", "A1001");
        order_repo::insert(pipeline.database(), &order).unwrap();

        let outcome = pipeline
            .process(&payload(
                "noreply@ups.com",
                "Your order has shipped",
                "Order #A1001 tracking 1Z999AA10123456784",
            ))
            .unwrap();
        assert!(!outcome.is_skipped());

        let rows = webhook_event_repo::list_recent(
            pipeline.database(),
            WebhookEventStatus::Processed,
            10,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        let results: serde_json::Value =
            serde_json::from_str(rows[0].results.as_deref().unwrap()).unwrap();
        assert_eq!(results[0]["status"], "created");
        assert!(rows[0].processed_at.is_some());
    }
}
