use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiptrackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] crate::ingest::IngestError),

    #[error("No database path configured and no home directory to default to")]
    NoDatabasePath,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid pattern for carrier '{code}': {reason}")]
    InvalidPattern { code: String, reason: String },

    #[error("Invalid carrier '{code}': {reason}")]
    InvalidCarrier { code: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ShiptrackError>;
