//! Carrier repository for the `carriers` table.
//!
//! Carriers are append-only: created the first time a code is seen and
//! reused unchanged afterwards.

use rusqlite::{params, OptionalExtension, Row};

use super::{now, optional, Database, DatabaseError, Resolved};

/// A carrier row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub tracking_url_template: Option<String>,
    pub created_at: String,
}

impl CarrierRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            tracking_url_template: row.get("tracking_url_template")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Fields for a carrier that may not exist yet.
#[derive(Debug, Clone)]
pub struct NewCarrier<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub tracking_url_template: Option<&'a str>,
}

/// Finds a carrier by its id.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<CarrierRow>, DatabaseError> {
    db.with_conn(|conn| {
        optional(conn.query_row(
            "SELECT * FROM carriers WHERE id = ?1",
            params![id],
            CarrierRow::from_row,
        ))
    })
}

/// Inserts a carrier unless one with the same code exists.
///
/// The unique index on `code` decides the winner when two requests race;
/// the loser reads back the winner's row and gets `Resolved::Existing`.
pub fn insert_or_fetch(
    db: &Database,
    carrier: &NewCarrier<'_>,
) -> Result<Resolved<CarrierRow>, DatabaseError> {
    db.with_conn(|conn| {
        let id = uuid::Uuid::new_v4().to_string();
        let inserted = conn.execute(
            "INSERT INTO carriers (id, code, name, tracking_url_template, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(code) DO NOTHING",
            params![
                id,
                carrier.code,
                carrier.name,
                carrier.tracking_url_template,
                now(),
            ],
        )?;

        let row = conn
            .query_row(
                "SELECT * FROM carriers WHERE code = ?1",
                params![carrier.code],
                CarrierRow::from_row,
            )
            .optional()?
            .ok_or_else(|| DatabaseError::ConflictRowMissing {
                key: carrier.code.to_string(),
            })?;

        if inserted == 1 {
            log::info!("Created carrier '{}' ({})", row.code, row.name);
            Ok(Resolved::Created(row))
        } else {
            Ok(Resolved::Existing(row))
        }
    })
}

/// Counts all carriers.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM carriers", [], |r| r.get(0))?;
        Ok(count)
    })
}
