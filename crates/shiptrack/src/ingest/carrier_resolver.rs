//! Get-or-create of carrier rows for detected carriers.

use crate::db::carrier_repo::{self, CarrierRow, NewCarrier};
use crate::db::{Database, DatabaseError, Resolved};
use crate::extractor::{CarrierDescriptor, TRACKING_PLACEHOLDER};

/// Turns a concrete tracking URL back into a template by substituting the
/// tracking number with the placeholder. Only the literal number is replaced.
pub fn url_template(raw_url: &str, tracking_number: &str) -> String {
    if tracking_number.is_empty() {
        return raw_url.to_string();
    }
    raw_url.replace(tracking_number, TRACKING_PLACEHOLDER)
}

/// Returns the stored carrier for `descriptor.code`, creating it on first
/// sight. Existing rows are returned as-is.
pub fn resolve_carrier(
    db: &Database,
    descriptor: &CarrierDescriptor,
    raw_tracking_url: &str,
    tracking_number: &str,
) -> Result<Resolved<CarrierRow>, DatabaseError> {
    let template = url_template(raw_tracking_url, tracking_number);
    carrier_repo::insert_or_fetch(
        db,
        &NewCarrier {
            code: &descriptor.code,
            name: &descriptor.name,
            tracking_url_template: Some(&template),
        },
    )
}
