//! pharmacollect - pharmacy directory scraping, geocoding and code generation.
//!
//! The pipeline scrapes a paginated business directory for pharmacy
//! listings, geocodes each one through a places search API, and emits a
//! Kotlin data file for inclusion in a mobile application.

pub mod cli;
pub mod config;
pub mod emit;
pub mod geo;
pub mod geocoding;
pub mod models;
pub mod scrapers;
pub mod stats;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;
