//! Database module for persistent storage.
//!
//! Uses rusqlite (SQLite) with a thread-safe `Database` handle.
//! All access is serialized through a `Mutex<Connection>`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod carrier_repo;
pub mod error;
pub mod migrations;
pub mod order_repo;
pub mod tracking_repo;
pub mod webhook_event_repo;

pub use error::DatabaseError;

/// Outcome of an insert keyed by a unique natural key.
///
/// Conflicts on the key are an expected branch rather than an error: the
/// caller gets back whichever row owns the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Created(T),
    Existing(T),
}

impl<T> Resolved<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Created(row) | Resolved::Existing(row) => row,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Resolved::Created(row) | Resolved::Existing(row) => row,
        }
    }
}

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`). WAL mode is enabled for file databases.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database for testing. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// Returns the canonical database path: `~/.shiptrack/data/shiptrack.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".shiptrack").join("data").join("shiptrack.db"))
}

/// Current time as an RFC 3339 string, the format used for every timestamp column.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Maps "no rows" to `None` for single-row lookups.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, DatabaseError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e)),
    }
}
