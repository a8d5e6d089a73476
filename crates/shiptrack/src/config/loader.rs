use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::extractor::carriers::{builtin_patterns, TRACKING_PLACEHOLDER};

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// `~/.shiptrack/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".shiptrack").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid bind address: {}", config.bind_address),
        });
    }

    // Configured carriers extend the built-in table and may not shadow it
    let mut codes: HashSet<String> = builtin_patterns()
        .into_iter()
        .map(|p| p.carrier.code)
        .collect();

    for carrier in &config.carriers {
        if !codes.insert(carrier.code.clone()) {
            return Err(ConfigError::InvalidCarrier {
                code: carrier.code.clone(),
                reason: "Duplicate carrier code".to_string(),
            });
        }

        if !carrier.tracking_url_template.contains(TRACKING_PLACEHOLDER) {
            return Err(ConfigError::InvalidCarrier {
                code: carrier.code.clone(),
                reason: format!(
                    "trackingUrlTemplate must contain the '{}' placeholder",
                    TRACKING_PLACEHOLDER
                ),
            });
        }

        for pattern in &carrier.patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::InvalidPattern {
                    code: carrier.code.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.bind_address, "127.0.0.1:8787");
        assert_eq!(config.default_workspace_id, "default");
        assert_eq!(config.broadcast_capacity, 256);
        assert_eq!(config.webhook.signature_header, "x-webhook-signature");
        assert!(config.carriers.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "bindAddress": "0.0.0.0:9000",
            "databasePath": "/var/lib/shiptrack/db.sqlite",
            "defaultWorkspaceId": "acme",
            "broadcastCapacity": 16,
            "webhook": {
                "secretEnvVar": "SHIPTRACK_WEBHOOK_SECRET",
                "signatureHeader": "x-signature"
            },
            "classifier": {
                "extraDomains": ["parcel.example"],
                "extraKeywords": ["dispatched"]
            },
            "carriers": [
                {
                    "code": "ontrac",
                    "name": "OnTrac",
                    "trackingUrlTemplate": "https://www.ontrac.com/tracking/?number={tracking}",
                    "patterns": ["\\bC\\d{14}\\b"]
                }
            ]
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/var/lib/shiptrack/db.sqlite"))
        );
        assert_eq!(config.default_workspace_id, "acme");
        assert_eq!(config.broadcast_capacity, 16);
        assert_eq!(config.webhook.signature_header, "x-signature");
        assert_eq!(config.classifier.extra_domains, vec!["parcel.example"]);
        assert_eq!(config.carriers.len(), 1);
        assert_eq!(config.carriers[0].code, "ontrac");
    }

    #[test]
    fn test_wrong_version_rejected_by_schema() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = load_config_from_str(r#"{ "version": "1.0", "workers": 4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_config_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = load_config_from_str(r#"{ "version": "1.0", "bindAddress": "localhost" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_invalid_carrier_regex() {
        let config_json = r#"
        {
            "version": "1.0",
            "carriers": [
                {
                    "code": "broken",
                    "name": "Broken",
                    "trackingUrlTemplate": "https://t.example/{tracking}",
                    "patterns": ["(unclosed"]
                }
            ]
        }
        "#;
        let err = load_config_from_str(config_json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { code, .. } if code == "broken"));
    }

    #[test]
    fn test_missing_placeholder() {
        let config_json = r#"
        {
            "version": "1.0",
            "carriers": [
                {
                    "code": "noph",
                    "name": "No Placeholder",
                    "trackingUrlTemplate": "https://t.example/track",
                    "patterns": ["\\bNP\\d{8}\\b"]
                }
            ]
        }
        "#;
        let err = load_config_from_str(config_json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCarrier { .. }));
    }

    #[test]
    fn test_duplicate_carrier_code() {
        let config_json = r#"
        {
            "version": "1.0",
            "carriers": [
                {
                    "code": "ups",
                    "name": "UPS again",
                    "trackingUrlTemplate": "https://t.example/{tracking}",
                    "patterns": ["\\bX\\d{8}\\b"]
                }
            ]
        }
        "#;
        let err = load_config_from_str(config_json).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidCarrier { code, reason } if code == "ups" && reason.contains("Duplicate"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_embedded_schema_is_valid_json() {
        let schema: serde_json::Value = serde_json::from_str(SCHEMA_JSON).unwrap();
        assert!(jsonschema::validator_for(&schema).is_ok());
    }
}
