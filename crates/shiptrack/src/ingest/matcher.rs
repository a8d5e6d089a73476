//! Binds extracted order references to stored orders.

use tracing::debug;

use crate::db::order_repo::{self, OrderRow};
use crate::db::{Database, DatabaseError};

/// Finds the order for the first reference that matches anything.
///
/// Each reference is tried in order as a case-insensitive substring of
/// `order_number`; the oldest matching order wins. Once a reference hits,
/// later references are not consulted even if they would match more
/// precisely.
pub fn match_order(
    db: &Database,
    references: &[String],
) -> Result<Option<OrderRow>, DatabaseError> {
    for reference in references {
        let reference = reference.trim();
        if reference.is_empty() {
            continue;
        }
        if let Some(order) = order_repo::find_first_containing(db, reference)? {
            debug!(
                "Order reference '{}' matched order {}",
                reference, order.order_number
            );
            return Ok(Some(order));
        }
    }
    Ok(None)
}
