//! Webhook event repository for the `webhook_events` audit table.
//!
//! Every inbound payload is stored verbatim as `pending` and later moved to
//! exactly one terminal status.

use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use super::{now, optional, Database, DatabaseError};

/// Processing status of a webhook event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventStatus {
    Pending,
    Processed,
    Skipped,
}

impl WebhookEventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventStatus::Pending => "pending",
            WebhookEventStatus::Processed => "processed",
            WebhookEventStatus::Skipped => "skipped",
        }
    }
}

/// A webhook event row from the database.
#[derive(Debug, Clone)]
pub struct WebhookEventRow {
    pub id: String,
    pub provider: String,
    pub sender: String,
    pub subject: String,
    pub message_id: Option<String>,
    pub payload: String,
    pub status: String,
    pub reason: Option<String>,
    pub results: Option<String>,
    pub received_at: String,
    pub processed_at: Option<String>,
}

impl WebhookEventRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            provider: row.get("provider")?,
            sender: row.get("sender")?,
            subject: row.get("subject")?,
            message_id: row.get("message_id")?,
            payload: row.get("payload")?,
            status: row.get("status")?,
            reason: row.get("reason")?,
            results: row.get("results")?,
            received_at: row.get("received_at")?,
            processed_at: row.get("processed_at")?,
        })
    }

    /// Builds a `pending` row for a freshly received payload.
    pub fn pending(
        provider: &str,
        sender: &str,
        subject: &str,
        message_id: Option<&str>,
        payload: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            sender: sender.to_string(),
            subject: subject.to_string(),
            message_id: message_id.map(str::to_string),
            payload: payload.to_string(),
            status: WebhookEventStatus::Pending.as_str().to_string(),
            reason: None,
            results: None,
            received_at: now(),
            processed_at: None,
        }
    }
}

/// Inserts a webhook event row.
pub fn insert(db: &Database, event: &WebhookEventRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO webhook_events (id, provider, sender, subject, message_id, payload,
             status, reason, results, received_at, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                event.id,
                event.provider,
                event.sender,
                event.subject,
                event.message_id,
                event.payload,
                event.status,
                event.reason,
                event.results,
                event.received_at,
                event.processed_at,
            ],
        )?;
        Ok(())
    })
}

/// Moves a pending event to a terminal status.
///
/// Returns `false` if the event was not pending (already finished or
/// missing); terminal rows are never rewritten.
pub fn finish<T: Serialize>(
    db: &Database,
    id: &str,
    status: WebhookEventStatus,
    reason: Option<&str>,
    results: Option<&T>,
) -> Result<bool, DatabaseError> {
    let results = results
        .map(serde_json::to_string)
        .transpose()
        .map_err(|source| DatabaseError::Json {
            column: "results",
            source,
        })?;

    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE webhook_events SET status = ?2, reason = ?3, results = ?4, processed_at = ?5
             WHERE id = ?1 AND status = 'pending'",
            params![id, status.as_str(), reason, results, now()],
        )?;
        Ok(changed == 1)
    })
}

/// Finds a webhook event by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<WebhookEventRow>, DatabaseError> {
    db.with_conn(|conn| {
        optional(conn.query_row(
            "SELECT * FROM webhook_events WHERE id = ?1",
            params![id],
            WebhookEventRow::from_row,
        ))
    })
}

/// Counts events with the given status.
pub fn count_by_status(db: &Database, status: WebhookEventStatus) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM webhook_events WHERE status = ?1",
            params![status.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Lists the most recent events with the given status.
pub fn list_recent(
    db: &Database,
    status: WebhookEventStatus,
    limit: u64,
) -> Result<Vec<WebhookEventRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM webhook_events WHERE status = ?1
             ORDER BY received_at DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![status.as_str(), limit as i64], WebhookEventRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
