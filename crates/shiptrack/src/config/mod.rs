//! JSON configuration: schema, loading and the components built from it.

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_from_str};
pub use schema::{CarrierConfig, ClassifierConfig, Config, WebhookConfig};

use regex::Regex;
use secrecy::SecretString;

use crate::classifier::ShippingClassifier;
use crate::error::ConfigError;
use crate::extractor::carriers::{builtin_patterns, CarrierDescriptor, CarrierPattern};
use crate::extractor::TrackingExtractor;
use crate::secrets::{resolve_secret_optional, SecretError};

impl Config {
    /// Resolves the webhook secret. `None` means signatures are not required.
    pub fn webhook_secret(&self) -> Result<Option<SecretString>, SecretError> {
        resolve_secret_optional(
            self.webhook.secret.as_deref(),
            self.webhook.secret_file.as_deref(),
            self.webhook.secret_env_var.as_deref(),
        )
    }

    pub fn build_classifier(&self) -> ShippingClassifier {
        ShippingClassifier::new(
            &self.classifier.extra_domains,
            &self.classifier.extra_keywords,
        )
    }

    /// Carrier table: built-in carriers first, then configured ones in file order.
    pub fn build_carrier_patterns(&self) -> Result<Vec<CarrierPattern>, ConfigError> {
        let mut patterns = builtin_patterns();
        for carrier in &self.carriers {
            let descriptor = CarrierDescriptor::new(
                &carrier.code,
                &carrier.name,
                &carrier.tracking_url_template,
            );
            for pattern in &carrier.patterns {
                let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    code: carrier.code.clone(),
                    reason: e.to_string(),
                })?;
                patterns.push(CarrierPattern::new(descriptor.clone(), regex));
            }
        }
        Ok(patterns)
    }

    pub fn build_extractor(&self) -> Result<TrackingExtractor, ConfigError> {
        Ok(TrackingExtractor::new(
            self.build_carrier_patterns()?,
            self.build_classifier(),
        ))
    }
}
