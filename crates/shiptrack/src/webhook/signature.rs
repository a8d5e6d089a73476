//! HMAC-SHA256 webhook signature verification.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default header carrying the signature.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-webhook-signature";

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signature header is missing")]
    Missing,

    #[error("Signature is not valid hex")]
    Malformed,

    #[error("Signature does not match payload")]
    Mismatch,

    #[error("Webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// Verifies a hex-encoded HMAC-SHA256 of the raw request body.
///
/// The header value may carry a `sha256=` prefix. Comparison is constant-time.
pub fn verify_signature(
    secret: &SecretString,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::Missing)?;
    let hex_part = header.strip_prefix(SIGNATURE_PREFIX).unwrap_or(header);
    let expected = hex::decode(hex_part).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Computes the hex signature for a body, without prefix.
pub fn sign(secret: &SecretString, body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
