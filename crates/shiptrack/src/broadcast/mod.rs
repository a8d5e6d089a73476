//! Broadcasting for real-time event streaming.

pub mod tracking_events;

pub use tracking_events::{
    workspace_channel, NoopNotifier, NotifyError, ReviewStatus, TrackingBroadcaster,
    TrackingEvent, TrackingIngested, TrackingNotifier, TRACKING_INGESTED,
};
