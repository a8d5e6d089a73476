//! Builds the scannable body text from the plain and HTML parts of an email.

use tracing::debug;

/// Joins the plain-text body and the HTML body (converted to text).
///
/// Either part may be missing. HTML that cannot be converted is scanned raw,
/// since tracking numbers rarely straddle markup.
pub fn body_text(text: Option<&str>, html: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        parts.push(text.to_string());
    }

    if let Some(html) = html.filter(|h| !h.trim().is_empty()) {
        match htmd::convert(html) {
            Ok(converted) => parts.push(converted),
            Err(e) => {
                debug!("HTML body conversion failed, scanning raw markup: {}", e);
                parts.push(html.to_string());
            }
        }
    }

    parts.join("\n")
}
