use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::webhook::DEFAULT_SIGNATURE_HEADER;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_workspace_id")]
    pub default_workspace_id: String,
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub carriers: Vec<CarrierConfig>,
}

fn default_bind_address() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_workspace_id() -> String {
    "default".to_string()
}

fn default_broadcast_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            bind_address: default_bind_address(),
            database_path: None,
            default_workspace_id: default_workspace_id(),
            broadcast_capacity: default_broadcast_capacity(),
            webhook: WebhookConfig::default(),
            classifier: ClassifierConfig::default(),
            carriers: Vec::new(),
        }
    }
}

/// Inbound webhook authentication.
///
/// The secret follows the usual source priority: `secret`, then
/// `secretFile`, then `secretEnvVar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub secret_file: Option<String>,
    #[serde(default)]
    pub secret_env_var: Option<String>,
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

fn default_signature_header() -> String {
    DEFAULT_SIGNATURE_HEADER.to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_file: None,
            secret_env_var: None,
            signature_header: default_signature_header(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default)]
    pub extra_domains: Vec<String>,
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

/// A carrier added on top of the built-in table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierConfig {
    pub code: String,
    pub name: String,
    pub tracking_url_template: String,
    pub patterns: Vec<String>,
}

impl Config {
    /// Database location, falling back to the per-user data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        match self.database_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Some(PathBuf::from(expand_tilde(path))),
            None => crate::db::default_database_path(),
        }
    }
}

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}
