//! Source code generation for the consuming mobile application.

mod kotlin;

use serde::{Deserialize, Serialize};

pub use kotlin::{render_kotlin, HELPER_BLOCK};

/// Names used in the generated Kotlin unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Kotlin package the generated object lives in.
    pub package: String,
    pub object_name: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            package: "com.pharmatech.morocco.features.pharmacy.domain.model".to_string(),
            object_name: "KenitraPharmacyData".to_string(),
        }
    }
}
