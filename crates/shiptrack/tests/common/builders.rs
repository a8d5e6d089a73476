//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use std::collections::BTreeMap;

use shiptrack::config::{CarrierConfig, Config};
use shiptrack::InboundEmailPayload;

/// Builder for `InboundEmailPayload` instances.
pub struct PayloadBuilder {
    payload: InboundEmailPayload,
}

impl PayloadBuilder {
    /// A UPS notification without body; add text or HTML as needed.
    pub fn new() -> Self {
        Self {
            payload: InboundEmailPayload {
                from: "noreply@ups.com".to_string(),
                subject: "Your order has shipped".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn from(mut self, from: &str) -> Self {
        self.payload.from = from.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.payload.subject = subject.to_string();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.payload.text = Some(text.to_string());
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.payload.html = Some(html.to_string());
        self
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.payload.message_id = Some(id.to_string());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        let headers: &mut BTreeMap<String, String> = &mut self.payload.headers;
        headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> InboundEmailPayload {
        self.payload
    }

    /// The payload as a raw request body.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.payload).expect("payload serializes")
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn extra_domain(mut self, domain: &str) -> Self {
        self.config.classifier.extra_domains.push(domain.to_string());
        self
    }

    pub fn extra_keyword(mut self, keyword: &str) -> Self {
        self.config
            .classifier
            .extra_keywords
            .push(keyword.to_string());
        self
    }

    pub fn carrier(mut self, code: &str, name: &str, template: &str, patterns: &[&str]) -> Self {
        self.config.carriers.push(CarrierConfig {
            code: code.to_string(),
            name: name.to_string(),
            tracking_url_template: template.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
