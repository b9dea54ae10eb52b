//! Summary figures over an enriched record file.

use std::collections::{BTreeMap, HashMap};

use crate::geo::Bounds;
use crate::models::{EnrichedRecord, GeocodeStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStats {
    pub total: usize,
    pub geocoded: usize,
    pub with_phone: usize,
    /// Record count per status, in declaration order of the statuses.
    pub by_status: BTreeMap<GeocodeStatus, usize>,
    /// Geocoded records inside the bounding box.
    pub in_region: usize,
    /// Records whose phone already appeared earlier in the list.
    pub duplicate_phones: usize,
}

impl PipelineStats {
    pub fn compute(records: &[EnrichedRecord], bounds: &Bounds) -> Self {
        let mut by_status = BTreeMap::new();
        let mut phones: HashMap<&str, usize> = HashMap::new();
        let mut stats = Self {
            total: records.len(),
            geocoded: 0,
            with_phone: 0,
            by_status: BTreeMap::new(),
            in_region: 0,
            duplicate_phones: 0,
        };

        for record in records {
            *by_status.entry(record.geocode_status).or_insert(0) += 1;
            if record.geocoded {
                stats.geocoded += 1;
                if bounds.contains(record.latitude, record.longitude) {
                    stats.in_region += 1;
                }
            }
            if record.has_phone() {
                stats.with_phone += 1;
                *phones.entry(record.phone.as_str()).or_insert(0) += 1;
            }
        }

        stats.duplicate_phones = phones.values().map(|n| n - 1).sum();
        stats.by_status = by_status;
        stats
    }

    pub fn geocoded_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.geocoded as f64 * 100.0 / self.total as f64
        }
    }

    pub fn status_count(&self, status: GeocodeStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
