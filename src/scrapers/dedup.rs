//! Optional phone-based deduplication of scraped listings.

use std::collections::HashSet;

use tracing::debug;

use crate::models::RawRecord;

/// Keep the first listing for each non-empty phone number.
/// Listings without a phone are always kept. Returns the kept records and
/// the number dropped.
pub fn dedup_by_phone(records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
    let mut seen = HashSet::new();
    let before = records.len();

    let kept: Vec<RawRecord> = records
        .into_iter()
        .filter(|record| {
            if record.phone.is_empty() || seen.insert(record.phone.clone()) {
                true
            } else {
                debug!("Dropping duplicate {} ({})", record.name, record.phone);
                false
            }
        })
        .collect();

    let dropped = before - kept.len();
    (kept, dropped)
}
