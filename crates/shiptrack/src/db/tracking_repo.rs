//! Tracking record repository for the `tracking_records` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{now, optional, Database, DatabaseError, Resolved};

/// Shipment status of a tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    Pending,
    InTransit,
    OutForDelivery,
    Delivered,
    Exception,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Pending => "pending",
            TrackingStatus::InTransit => "in_transit",
            TrackingStatus::OutForDelivery => "out_for_delivery",
            TrackingStatus::Delivered => "delivered",
            TrackingStatus::Exception => "exception",
        }
    }
}

/// A tracking record row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    pub id: String,
    pub order_id: String,
    pub carrier_id: String,
    pub tracking_number: String,
    pub status: String,
    /// Free-form status log, `[]` until a status update arrives.
    pub status_history: Vec<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl TrackingRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let history: String = row.get("status_history")?;
        let status_history = serde_json::from_str(&history).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            order_id: row.get("order_id")?,
            carrier_id: row.get("carrier_id")?,
            tracking_number: row.get("tracking_number")?,
            status: row.get("status")?,
            status_history,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Fields for a new tracking record.
#[derive(Debug, Clone)]
pub struct NewTracking<'a> {
    pub order_id: &'a str,
    pub carrier_id: &'a str,
    pub tracking_number: &'a str,
}

/// Finds a tracking record by its tracking number.
pub fn find_by_number(
    db: &Database,
    tracking_number: &str,
) -> Result<Option<TrackingRow>, DatabaseError> {
    db.with_conn(|conn| {
        optional(conn.query_row(
            "SELECT * FROM tracking_records WHERE tracking_number = ?1",
            params![tracking_number],
            TrackingRow::from_row,
        ))
    })
}

/// Inserts a `pending` tracking record with an empty history unless the
/// tracking number is already taken.
///
/// Tracking numbers are globally unique; the first writer wins and a later
/// insert returns the existing row untouched.
pub fn insert_or_fetch(
    db: &Database,
    tracking: &NewTracking<'_>,
) -> Result<Resolved<TrackingRow>, DatabaseError> {
    db.with_conn(|conn| {
        let id = uuid::Uuid::new_v4().to_string();
        let ts = now();
        let inserted = conn.execute(
            "INSERT INTO tracking_records (id, order_id, carrier_id, tracking_number, status,
             status_history, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6, ?6)
             ON CONFLICT(tracking_number) DO NOTHING",
            params![
                id,
                tracking.order_id,
                tracking.carrier_id,
                tracking.tracking_number,
                TrackingStatus::Pending.as_str(),
                ts,
            ],
        )?;

        let row = conn
            .query_row(
                "SELECT * FROM tracking_records WHERE tracking_number = ?1",
                params![tracking.tracking_number],
                TrackingRow::from_row,
            )
            .optional()?
            .ok_or_else(|| DatabaseError::ConflictRowMissing {
                key: tracking.tracking_number.to_string(),
            })?;

        if inserted == 1 {
            Ok(Resolved::Created(row))
        } else {
            Ok(Resolved::Existing(row))
        }
    })
}

/// Counts all tracking records.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM tracking_records", [], |r| r.get(0))?;
        Ok(count)
    })
}
