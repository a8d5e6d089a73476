//! Decides whether an inbound email is a shipping notification at all.
//!
//! Only sender and subject are inspected. Everything here is a fixed set of
//! substring checks, so the answer is deterministic for any input pair.

/// Carrier and shipping-platform domains whose mail is treated as shipping mail.
pub const SHIPPING_DOMAINS: &[&str] = &[
    "ups.com",
    "fedex.com",
    "usps.com",
    "usps.gov",
    "dhl.com",
    "dhl.de",
    "ontrac.com",
    "lasership.com",
    "canadapost.ca",
    "royalmail.com",
    "shipstation.com",
    "shippo.com",
    "easypost.com",
    "aftership.com",
    "narvar.com",
    "shipbob.com",
];

/// Subject fragments (lower-case) that signal a shipping notification.
pub const SUBJECT_KEYWORDS: &[&str] = &[
    "shipped",
    "shipping",
    "shipment",
    "tracking",
    "out for delivery",
    "delivery confirmation",
    "delivered",
    "on its way",
    "in transit",
    "track your",
];

/// Words in the sender's local part that mark an automated shipping mailbox.
const SENDER_KEYWORDS: &[&str] = &["shipping", "shipment", "tracking", "delivery"];

/// Shipping-email classifier with the built-in tables plus configured extras.
#[derive(Debug, Clone)]
pub struct ShippingClassifier {
    domains: Vec<String>,
    keywords: Vec<String>,
}

impl Default for ShippingClassifier {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

impl ShippingClassifier {
    pub fn new(extra_domains: &[String], extra_keywords: &[String]) -> Self {
        let domains = SHIPPING_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .chain(extra_domains.iter().map(|d| d.trim().to_ascii_lowercase()))
            .filter(|d| !d.is_empty())
            .collect();
        let keywords = SUBJECT_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .chain(extra_keywords.iter().map(|k| k.trim().to_lowercase()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { domains, keywords }
    }

    /// Returns true when the email is plausibly a shipping notification.
    pub fn is_shipping_email(&self, sender: &str, subject: &str) -> bool {
        if self.is_known_shipping_domain(sender) {
            return true;
        }

        if let Some(local) = sender_local_part(sender) {
            if SENDER_KEYWORDS.iter().any(|k| local.contains(k)) {
                return true;
            }
        }

        let subject = subject.to_lowercase();
        self.keywords.iter().any(|k| subject.contains(k.as_str()))
    }

    /// Returns true when the sender's domain is a recognized shipping domain
    /// or a subdomain of one.
    pub fn is_known_shipping_domain(&self, sender: &str) -> bool {
        let Some(domain) = sender_domain(sender) else {
            return false;
        };
        self.domains
            .iter()
            .any(|known| domain == *known || domain.ends_with(&format!(".{}", known)))
    }
}

/// Free-function form using only the built-in tables.
pub fn is_shipping_email(sender: &str, subject: &str) -> bool {
    ShippingClassifier::default().is_shipping_email(sender, subject)
}

/// Extracts the bare address from `a@b` or `Display Name <a@b>`, lower-cased.
pub fn sender_address(sender: &str) -> Option<String> {
    let sender = sender.trim();
    let address = match (sender.rfind('<'), sender.rfind('>')) {
        (Some(start), Some(end)) if start < end => &sender[start + 1..end],
        _ => sender,
    };
    let address = address.trim();
    if address.contains('@') {
        Some(address.to_ascii_lowercase())
    } else {
        None
    }
}

/// Domain part of the sender address, lower-cased.
pub fn sender_domain(sender: &str) -> Option<String> {
    let address = sender_address(sender)?;
    let (_, domain) = address.rsplit_once('@')?;
    let domain = domain.trim_end_matches('.');
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

fn sender_local_part(sender: &str) -> Option<String> {
    let address = sender_address(sender)?;
    address.rsplit_once('@').map(|(local, _)| local.to_string())
}
