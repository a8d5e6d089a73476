//! Real-time tracking notifications, scoped to a workspace channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Event name for newly persisted tracking records.
pub const TRACKING_INGESTED: &str = "tracking:ingested";

/// Channel name for a workspace.
pub fn workspace_channel(workspace_id: &str) -> String {
    format!("workspace:{}", workspace_id)
}

/// Whether a persisted tracking record still needs an operator's look.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    PendingReview,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingIngested {
    pub tracking_id: String,
    pub tracking_number: String,
    pub carrier_name: String,
    pub order_id: String,
    pub review_status: ReviewStatus,
}

/// An event published on a workspace channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub channel: String,
    pub event: String,
    pub payload: TrackingIngested,
    pub timestamp: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn ingested(workspace_id: &str, payload: TrackingIngested) -> Self {
        Self {
            channel: workspace_channel(workspace_id),
            event: TRACKING_INGESTED.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Notification publish failed: {0}")]
    Publish(String),
}

/// Destination for tracking notifications.
///
/// Publishing is best-effort; callers log failures and carry on.
pub trait TrackingNotifier: Send + Sync {
    fn publish(&self, event: TrackingEvent) -> Result<(), NotifyError>;
}

/// Notifier that drops everything. Used where no listener exists.
pub struct NoopNotifier;

impl TrackingNotifier for NoopNotifier {
    fn publish(&self, _event: TrackingEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// In-process fan-out of tracking events to any number of subscribers.
#[derive(Clone)]
pub struct TrackingBroadcaster {
    sender: Arc<broadcast::Sender<TrackingEvent>>,
}

impl TrackingBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribes to events on every channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackingEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TrackingBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TrackingNotifier for TrackingBroadcaster {
    fn publish(&self, event: TrackingEvent) -> Result<(), NotifyError> {
        // No active receivers is fine
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TrackingIngested {
        TrackingIngested {
            tracking_id: "t1".to_string(),
            tracking_number: "1Z999AA10123456784".to_string(),
            carrier_name: "UPS".to_string(),
            order_id: "o1".to_string(),
            review_status: ReviewStatus::Approved,
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let broadcaster = TrackingBroadcaster::new(4);
        assert!(broadcaster
            .publish(TrackingEvent::ingested("ws-1", payload()))
            .is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let broadcaster = TrackingBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();

        broadcaster
            .publish(TrackingEvent::ingested("ws-1", payload()))
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.channel, "workspace:ws-1");
        assert_eq!(event.event, TRACKING_INGESTED);
        assert_eq!(event.payload.carrier_name, "UPS");
    }

    #[test]
    fn test_event_json_shape() {
        let mut p = payload();
        p.review_status = ReviewStatus::PendingReview;
        let json = serde_json::to_value(TrackingEvent::ingested("ws-1", p)).unwrap();
        assert_eq!(json["event"], "tracking:ingested");
        assert_eq!(json["payload"]["trackingNumber"], "1Z999AA10123456784");
        assert_eq!(json["payload"]["reviewStatus"], "pending_review");
    }
}
