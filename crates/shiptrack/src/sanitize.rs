//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Email addresses and message IDs identify customers; spans only ever see
//! redacted or hashed forms.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Masks the local part of an email address, keeping its first character
/// and the domain.
///
/// - `noreply@ups.com` → `n***@ups.com`
/// - `UPS <pkg@ups.com>` → `p***@ups.com`
/// - `garbage` → `<redacted>`
pub fn redact_email(sender: &str) -> String {
    let Some(address) = crate::classifier::sender_address(sender) else {
        return if sender.trim().is_empty() {
            "<empty>".to_string()
        } else {
            "<redacted>".to_string()
        };
    };
    match address.rsplit_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "<redacted>".to_string(),
    }
}

/// Short deterministic hash for correlating a value across log lines.
pub fn hash_value(value: &str) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
