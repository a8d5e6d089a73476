//! Built-in carrier table.
//!
//! The table is an ordered list of immutable `(descriptor, pattern)` pairs.
//! Order matters: when two carriers claim the same number, the earlier entry
//! is the one the registrar ends up using.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the tracking number in URL templates.
pub const TRACKING_PLACEHOLDER: &str = "{tracking}";

/// Identity of a shipping carrier as known to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierDescriptor {
    /// Short stable key, e.g. `ups`.
    pub code: String,
    /// Human-readable name, e.g. `UPS`.
    pub name: String,
    /// Public tracking link with [`TRACKING_PLACEHOLDER`] in place of the number.
    pub tracking_url_template: String,
}

impl CarrierDescriptor {
    pub fn new(code: &str, name: &str, tracking_url_template: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            tracking_url_template: tracking_url_template.to_string(),
        }
    }

    /// Public tracking link for a concrete tracking number.
    pub fn tracking_url(&self, tracking_number: &str) -> String {
        self.tracking_url_template
            .replace(TRACKING_PLACEHOLDER, tracking_number)
    }
}

/// A detection pattern bound to the carrier it identifies.
///
/// When the pattern has a capture group, group 1 is the tracking number;
/// otherwise the whole match is.
#[derive(Debug, Clone)]
pub struct CarrierPattern {
    pub carrier: CarrierDescriptor,
    pub pattern: Regex,
}

impl CarrierPattern {
    pub fn new(carrier: CarrierDescriptor, pattern: Regex) -> Self {
        Self { carrier, pattern }
    }

    /// All tracking numbers this pattern finds in `text`, with their byte offsets.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<(usize, &'t str)> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| (m.start(), m.as_str()))
            .collect()
    }
}

struct BuiltinCarrier {
    code: &'static str,
    name: &'static str,
    url: &'static str,
    patterns: &'static [&'static str],
}

const BUILTIN_CARRIERS: &[BuiltinCarrier] = &[
    BuiltinCarrier {
        code: "ups",
        name: "UPS",
        url: "https://www.ups.com/track?tracknum={tracking}",
        patterns: &[r"\b1Z[0-9A-Z]{16}\b"],
    },
    BuiltinCarrier {
        code: "usps",
        name: "USPS",
        url: "https://tools.usps.com/go/TrackConfirmAction?tLabels={tracking}",
        patterns: &[r"\b(?:9[2-5]\d{20}|9[2-5]\d{24})\b", r"\b[A-Z]{2}\d{9}US\b"],
    },
    BuiltinCarrier {
        code: "fedex",
        name: "FedEx",
        url: "https://www.fedex.com/fedextrack/?trknbr={tracking}",
        patterns: &[r"\b(?:\d{12}|\d{15}|\d{20}|\d{22})\b"],
    },
    BuiltinCarrier {
        code: "dhl",
        name: "DHL",
        url: "https://www.dhl.com/en/express/tracking.html?AWB={tracking}",
        patterns: &[r"\bJJD\d{10,20}\b", r"(?i:\bdhl\b)\D{0,40}?\b(\d{10})\b"],
    },
];

/// Builds the built-in carrier table in detection order.
pub fn builtin_patterns() -> Vec<CarrierPattern> {
    BUILTIN_CARRIERS
        .iter()
        .flat_map(|c| {
            let descriptor = CarrierDescriptor::new(c.code, c.name, c.url);
            c.patterns.iter().filter_map(move |p| match Regex::new(p) {
                Ok(regex) => Some(CarrierPattern::new(descriptor.clone(), regex)),
                Err(e) => {
                    log::error!("Built-in pattern for '{}' failed to compile: {}", c.code, e);
                    None
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_carrier_for(text: &str) -> Option<String> {
        builtin_patterns()
            .into_iter()
            .find(|p| !p.find_all(text).is_empty())
            .map(|p| p.carrier.code)
    }

    #[test]
    fn test_all_builtin_patterns_compile() {
        let patterns = builtin_patterns();
        let total: usize = BUILTIN_CARRIERS.iter().map(|c| c.patterns.len()).sum();
        assert_eq!(patterns.len(), total);
    }

    #[test]
    fn test_tracking_url() {
        let ups = CarrierDescriptor::new("ups", "UPS", "https://t.example/{tracking}?x=1");
        assert_eq!(ups.tracking_url("1Z1"), "https://t.example/1Z1?x=1");
    }

    #[test]
    fn test_carrier_detection() {
        assert_eq!(first_carrier_for("1Z999AA10123456784").as_deref(), Some("ups"));
        assert_eq!(
            first_carrier_for("9400111899223197428490").as_deref(),
            Some("usps")
        );
        assert_eq!(first_carrier_for("EC123456789US").as_deref(), Some("usps"));
        assert_eq!(first_carrier_for("123456789012").as_deref(), Some("fedex"));
        assert_eq!(first_carrier_for("JJD0099999999").as_deref(), Some("dhl"));
        assert_eq!(first_carrier_for("no numbers here"), None);
    }

    #[test]
    fn test_dhl_contextual_capture_group() {
        let dhl = builtin_patterns()
            .into_iter()
            .filter(|p| p.carrier.code == "dhl")
            .nth(1)
            .unwrap();
        let found = dhl.find_all("Your DHL Express waybill: 1234567890 is on the way");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, "1234567890");
        assert!(dhl.find_all("Call 1234567890").is_empty());
    }

    #[test]
    fn test_embedded_digits_not_matched() {
        // Digits glued to letters are not standalone FedEx numbers.
        assert_eq!(first_carrier_for("REF123456789012X"), None);
    }
}
