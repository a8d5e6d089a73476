//! Inbound email webhook payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extractor::text::body_text;

/// Recipient field: providers send either one address or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::Many(Vec::new())
    }
}

impl Recipients {
    pub fn addresses(&self) -> Vec<&str> {
        match self {
            Recipients::One(addr) => vec![addr.as_str()],
            Recipients::Many(addrs) => addrs.iter().map(String::as_str).collect(),
        }
    }
}

/// Attachment metadata. Attachment content is never inspected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Raw inbound email as delivered by the email provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InboundEmailPayload {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Recipients,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInfo>,
}

impl InboundEmailPayload {
    /// Parses a raw JSON request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Message ID from the field or, failing that, the `Message-ID` header.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref().or_else(|| {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("message-id"))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Body text to scan: plain part plus converted HTML part.
    pub fn body_text(&self) -> String {
        body_text(self.text.as_deref(), self.html.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let payload = InboundEmailPayload::from_slice(
            br#"{"from":"noreply@ups.com","to":"orders@shop.example","subject":"Shipped"}"#,
        )
        .unwrap();
        assert_eq!(payload.from, "noreply@ups.com");
        assert_eq!(payload.to.addresses(), vec!["orders@shop.example"]);
        assert!(payload.text.is_none());
        assert!(payload.attachments.is_empty());
    }

    #[test]
    fn test_parse_full() {
        let payload = InboundEmailPayload::from_slice(
            br#"{
                "from": "UPS <noreply@ups.com>",
                "to": ["a@shop.example", "b@shop.example"],
                "subject": "Shipped",
                "text": "plain",
                "html": "<p>html</p>",
                "headers": {"Message-ID": "<abc@ups.com>"},
                "attachments": [{"filename": "label.pdf", "contentType": "application/pdf", "size": 12}]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.to.addresses().len(), 2);
        assert_eq!(payload.message_id(), Some("<abc@ups.com>"));
        assert_eq!(payload.attachments[0].filename.as_deref(), Some("label.pdf"));
        assert!(payload.body_text().contains("plain"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(InboundEmailPayload::from_slice(b"{not json").is_err());
        assert!(InboundEmailPayload::from_slice(b"[1,2]").is_err());
    }

    #[test]
    fn test_explicit_message_id_wins() {
        let payload = InboundEmailPayload {
            message_id: Some("<field>".to_string()),
            headers: BTreeMap::from([("message-id".to_string(), "<header>".to_string())]),
            ..Default::default()
        };
        assert_eq!(payload.message_id(), Some("<field>"));
    }
}
