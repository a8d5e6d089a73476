//! Tracking-number and order-reference extraction.
//!
//! The extractor is a pure function of its carrier table and the email text:
//! no I/O, no shared mutable state.

pub mod carriers;
pub mod text;

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::ShippingClassifier;

pub use carriers::{builtin_patterns, CarrierDescriptor, CarrierPattern, TRACKING_PLACEHOLDER};

/// Coarse confidence of a parse, gating auto-approval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

/// One detected tracking number and the carrier whose pattern found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingCandidate {
    pub tracking_number: String,
    pub carrier: Option<CarrierDescriptor>,
}

/// Everything extracted from a single email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub candidates: Vec<TrackingCandidate>,
    pub order_references: Vec<String>,
    pub confidence: Confidence,
}

impl ParseResult {
    /// Distinct tracking numbers in extraction order.
    pub fn distinct_tracking_numbers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.candidates
            .iter()
            .map(|c| c.tracking_number.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    }

    /// First candidate for each tracking number, in extraction order.
    pub fn unique_candidates(&self) -> Vec<&TrackingCandidate> {
        let mut seen = HashSet::new();
        self.candidates
            .iter()
            .filter(|c| seen.insert(c.tracking_number.as_str()))
            .collect()
    }
}

static RE_ORDER_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\border\b\s*(?:number|num\.?|no\.?|id)?\s*[:#]?\s*#?\s*([A-Z0-9][A-Z0-9-]{2,29})\b")
        .unwrap()
});
static RE_ORDER_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s|\()#([A-Z0-9][A-Z0-9-]{3,29})\b").unwrap());
static RE_GENERIC_TRACKING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btracking\s*(?:number|no\.?|#|id)\s*(?:is)?\s*[:#]?\s*([A-Z0-9]{8,30})\b")
        .unwrap()
});

/// Scans email text for carrier tracking numbers and order references.
#[derive(Debug, Clone)]
pub struct TrackingExtractor {
    carriers: Vec<CarrierPattern>,
    classifier: ShippingClassifier,
}

impl TrackingExtractor {
    /// Creates an extractor over an explicit carrier table.
    pub fn new(carriers: Vec<CarrierPattern>, classifier: ShippingClassifier) -> Self {
        Self {
            carriers,
            classifier,
        }
    }

    /// Creates an extractor over the built-in carrier table.
    pub fn with_builtin_carriers(classifier: ShippingClassifier) -> Self {
        Self::new(builtin_patterns(), classifier)
    }

    /// Parses one email. `body` may be plain text or text converted from HTML.
    pub fn extract(&self, sender: &str, subject: &str, body: &str) -> ParseResult {
        let text = format!("{}\n{}", subject, body);

        // Tokens labelled as the order belong to the order, whatever they look like.
        let order_spans = labelled_order_spans(&text);
        let candidates = self.find_tracking_numbers(&text, &order_spans);
        let tracking_numbers: HashSet<String> = candidates
            .iter()
            .map(|c| c.tracking_number.to_ascii_uppercase())
            .collect();
        let order_references = find_order_references(&text, &order_spans, &tracking_numbers);

        let has_carrier_match = candidates.iter().any(|c| c.carrier.is_some());
        let confidence = if has_carrier_match
            && !order_references.is_empty()
            && self.classifier.is_known_shipping_domain(sender)
        {
            Confidence::High
        } else {
            Confidence::Low
        };

        debug!(
            "Extracted {} tracking candidates, {} order references ({:?})",
            candidates.len(),
            order_references.len(),
            confidence
        );

        ParseResult {
            candidates,
            order_references,
            confidence,
        }
    }

    fn find_tracking_numbers(&self, text: &str, order_spans: &[Range<usize>]) -> Vec<TrackingCandidate> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut candidates = Vec::new();

        for carrier_pattern in &self.carriers {
            for (start, number) in carrier_pattern.find_all(text) {
                if within(order_spans, start..start + number.len()) {
                    continue;
                }
                let key = (number.to_string(), carrier_pattern.carrier.code.clone());
                if seen.insert(key) {
                    candidates.push(TrackingCandidate {
                        tracking_number: number.to_string(),
                        carrier: Some(carrier_pattern.carrier.clone()),
                    });
                }
            }
        }

        // Numbers announced as "tracking number: X" that no carrier recognizes.
        let known: HashSet<String> = candidates
            .iter()
            .map(|c| c.tracking_number.to_ascii_uppercase())
            .collect();
        let mut generic_seen = HashSet::new();
        for caps in RE_GENERIC_TRACKING.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            if within(order_spans, m.range()) {
                continue;
            }
            let number = m.as_str().to_ascii_uppercase();
            if !number.chars().any(|c| c.is_ascii_digit()) || known.contains(&number) {
                continue;
            }
            if generic_seen.insert(number.clone()) {
                candidates.push(TrackingCandidate {
                    tracking_number: number,
                    carrier: None,
                });
            }
        }

        candidates
    }
}

/// Byte ranges of tokens introduced by the word `order`.
fn labelled_order_spans(text: &str) -> Vec<Range<usize>> {
    RE_ORDER_KEYWORD
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|m| m.as_str().chars().any(|c| c.is_ascii_digit()))
        .map(|m| m.range())
        .collect()
}

fn within(spans: &[Range<usize>], range: Range<usize>) -> bool {
    spans
        .iter()
        .any(|span| span.start <= range.start && range.end <= span.end)
}

/// Distinct order references in order of first appearance. A bare `#TOKEN`
/// equal to a detected tracking number is taken to be that tracking number.
fn find_order_references(
    text: &str,
    order_spans: &[Range<usize>],
    tracking_numbers: &HashSet<String>,
) -> Vec<String> {
    let mut found: Vec<(Range<usize>, &str)> = [&*RE_ORDER_KEYWORD, &*RE_ORDER_HASH]
        .into_iter()
        .flat_map(|p| p.captures_iter(text).filter_map(|caps| caps.get(1)))
        .map(|m| (m.range(), m.as_str()))
        .collect();
    found.sort_by_key(|(range, _)| range.start);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|(range, token)| {
            within(order_spans, range.clone())
                || !tracking_numbers.contains(&token.to_ascii_uppercase())
        })
        .map(|(_, token)| token.trim_end_matches('-'))
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()))
        .filter(|token| seen.insert(token.to_ascii_uppercase()))
        .map(str::to_string)
        .collect()
}

impl Default for TrackingExtractor {
    fn default() -> Self {
        Self::with_builtin_carriers(ShippingClassifier::default())
    }
}
