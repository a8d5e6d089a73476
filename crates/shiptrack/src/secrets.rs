//! Webhook secret resolution from multiple sources.
//!
//! Sources are tried in priority order:
//!
//! 1. **Direct value** - for local testing (`"secret": "whsec_..."`)
//! 2. **File reference** - Docker secrets (`"secretFile": "/run/secrets/webhook"`)
//! 3. **Env var reference** - production (`"secretEnvVar": "SHIPTRACK_WEBHOOK_SECRET"`)

use secrecy::SecretString;
use std::fs;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Secret from {source_kind} is empty")]
    Empty { source_kind: &'static str },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first configured source.
///
/// Empty strings count as "not configured". A configured file or env var
/// that yields only whitespace is an error rather than an empty key.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
            path: expanded.clone(),
            source: e,
        })?;
        return non_empty(content.trim(), "file");
    }

    if let Some(var_name) = env_var.filter(|v| !v.is_empty()) {
        return match std::env::var(var_name) {
            // Env vars may carry a trailing newline
            Ok(value) => non_empty(value.trim(), "environment"),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: var_name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: var_name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Like [`resolve_secret`], but no configured source yields `None`.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) => Ok(None),
        Err(e) => Err(e),
    }
}

fn non_empty(value: &str, source_kind: &'static str) -> Result<SecretString> {
    if value.is_empty() {
        Err(SecretError::Empty { source_kind })
    } else {
        Ok(SecretString::from(value.to_string()))
    }
}

/// Expands a leading `~` to the home directory. `~user` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_direct_value_wins() {
        let secret = resolve_secret(Some("direct"), Some("/nonexistent"), Some("NOPE")).unwrap();
        assert_eq!(secret.expose_secret(), "direct");
    }

    #[test]
    fn test_file_source_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let secret = resolve_secret(Some(""), Some(&path), None).unwrap();
        assert_eq!(secret.expose_secret(), "from-file");
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = resolve_secret(None, Some("/definitely/not/here"), None).unwrap_err();
        assert!(matches!(err, SecretError::FileReadError { .. }));
    }

    #[test]
    fn test_empty_file_is_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let err = resolve_secret(None, Some(&path), None).unwrap_err();
        assert!(matches!(err, SecretError::Empty { source_kind: "file" }));
    }

    #[test]
    #[serial]
    fn test_env_var_source() {
        std::env::set_var("SHIPTRACK_TEST_SECRET", "from-env\n");
        let secret = resolve_secret(None, None, Some("SHIPTRACK_TEST_SECRET")).unwrap();
        assert_eq!(secret.expose_secret(), "from-env");
        std::env::remove_var("SHIPTRACK_TEST_SECRET");
    }

    #[test]
    #[serial]
    fn test_env_var_not_set() {
        std::env::remove_var("SHIPTRACK_TEST_SECRET_MISSING");
        let err = resolve_secret(None, None, Some("SHIPTRACK_TEST_SECRET_MISSING")).unwrap_err();
        assert!(matches!(err, SecretError::EnvVarNotSet { .. }));
    }

    #[test]
    fn test_optional_without_sources() {
        assert!(resolve_secret_optional(None, Some(""), None).unwrap().is_none());
        assert!(matches!(
            resolve_secret(None, None, None),
            Err(SecretError::NoSourceProvided)
        ));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), "/abs/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home.to_string_lossy());
            assert!(expand_home("~/x").ends_with("/x"));
            assert!(!expand_home("~/x").starts_with('~'));
        }
    }
}
