//! Order repository for the `orders` table.
//!
//! Orders are owned by the storefront; ingestion only reads them and writes
//! the denormalized tracking columns.

use rusqlite::{params, Row};

use super::{now, optional, Database, DatabaseError};

/// An order row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub workspace_id: String,
    pub order_number: String,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            workspace_id: row.get("workspace_id")?,
            order_number: row.get("order_number")?,
            tracking_number: row.get("tracking_number")?,
            tracking_url: row.get("tracking_url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Builds a fresh order row with a generated ID.
    pub fn new(workspace_id: &str, order_number: &str) -> Self {
        let ts = now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            order_number: order_number.to_string(),
            tracking_number: None,
            tracking_url: None,
            created_at: ts.clone(),
            updated_at: ts,
        }
    }
}

/// Inserts a new order row.
pub fn insert(db: &Database, order: &OrderRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO orders (id, workspace_id, order_number, tracking_number, tracking_url,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                order.id,
                order.workspace_id,
                order.order_number,
                order.tracking_number,
                order.tracking_url,
                order.created_at,
                order.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds an order by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<OrderRow>, DatabaseError> {
    db.with_conn(|conn| {
        optional(conn.query_row(
            "SELECT * FROM orders WHERE id = ?1",
            params![id],
            OrderRow::from_row,
        ))
    })
}

/// Finds the oldest order whose number contains `fragment`, ignoring case.
///
/// `instr` is used instead of `LIKE` so that `%` and `_` in the fragment
/// are matched literally.
pub fn find_first_containing(
    db: &Database,
    fragment: &str,
) -> Result<Option<OrderRow>, DatabaseError> {
    db.with_conn(|conn| {
        optional(conn.query_row(
            "SELECT * FROM orders
             WHERE instr(lower(order_number), lower(?1)) > 0
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1",
            params![fragment],
            OrderRow::from_row,
        ))
    })
}

/// Writes the denormalized tracking columns of an order.
pub fn set_tracking(
    db: &Database,
    id: &str,
    tracking_number: &str,
    tracking_url: Option<&str>,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE orders SET tracking_number = ?2, tracking_url = ?3, updated_at = ?4
             WHERE id = ?1",
            params![id, tracking_number, tracking_url, now()],
        )?;
        Ok(())
    })
}
