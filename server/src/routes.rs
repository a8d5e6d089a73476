use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use shiptrack::broadcast::workspace_channel;
use shiptrack::{verify_signature, InboundEmailPayload, IngestOutcome, TrackingEvent};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/inbound-email", post(inbound_email))
        .route("/workspaces/{workspace_id}/events", get(workspace_events))
        .route("/events", get(default_workspace_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /webhooks/inbound-email
/// Verify, parse and ingest one inbound email
async fn inbound_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    // The signature covers the raw bytes; nothing is parsed before it checks out
    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get(&state.signature_header)
            .and_then(|v| v.to_str().ok());
        verify_signature(secret, &body, signature).map_err(|e| {
            warn!("Rejected inbound webhook: {}", e);
            ApiError::Unauthorized
        })?;
    }

    let payload =
        InboundEmailPayload::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let raw = String::from_utf8_lossy(&body).into_owned();

    let pipeline = Arc::clone(&state.pipeline);
    let outcome =
        tokio::task::spawn_blocking(move || pipeline.process_raw(&payload, &raw)).await??;

    let response = match outcome {
        IngestOutcome::Skipped { reason } => json!({
            "success": true,
            "skipped": true,
            "reason": reason,
        }),
        IngestOutcome::Processed { parsed, results } => json!({
            "success": true,
            "parsed": parsed,
            "results": results,
        }),
    };
    Ok(Json(response))
}

/// GET /workspaces/{workspace_id}/events
async fn workspace_events(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    event_stream(&state, &workspace_id)
}

/// GET /events
async fn default_workspace_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    event_stream(&state, &state.default_workspace_id)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn event_stream(
    state: &AppState,
    workspace_id: &str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let channel = workspace_channel(workspace_id);
    debug!("SSE subscriber joined {}", channel);

    let stream = BroadcastStream::new(state.broadcaster.subscribe()).filter_map(move |msg| {
        match msg {
            Ok(event) => sse_event(&event, &channel).map(Ok),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("SSE subscriber on {} lagged, {} events dropped", channel, skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// SSE frame for `event` if it belongs to `channel`.
fn sse_event(event: &TrackingEvent, channel: &str) -> Option<Event> {
    if event.channel != channel {
        return None;
    }
    match Event::default().event(event.event.as_str()).json_data(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Failed to encode SSE event: {}", e);
            None
        }
    }
}
