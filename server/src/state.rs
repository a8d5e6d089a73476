//! Shared state handed to every request handler.

use std::sync::Arc;

use secrecy::SecretString;
use shiptrack::{IngestPipeline, TrackingBroadcaster};

pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    pub broadcaster: TrackingBroadcaster,
    /// `None` disables signature checks.
    pub webhook_secret: Option<SecretString>,
    /// Lower-case header carrying the HMAC signature.
    pub signature_header: String,
    /// Workspace served by `GET /events`.
    pub default_workspace_id: String,
}

impl AppState {
    pub fn new(
        pipeline: IngestPipeline,
        broadcaster: TrackingBroadcaster,
        webhook_secret: Option<SecretString>,
        signature_header: &str,
        default_workspace_id: &str,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            broadcaster,
            webhook_secret,
            signature_header: signature_header.to_ascii_lowercase(),
            default_workspace_id: default_workspace_id.to_string(),
        }
    }
}
