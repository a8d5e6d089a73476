use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Storage failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}
