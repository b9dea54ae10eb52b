//! Data models for pharmacollect.

mod record;

pub use record::{
    record_id, EnrichedRecord, GeocodeOutcome, GeocodeStatus, RawRecord, SENTINEL_COORDINATES,
};
