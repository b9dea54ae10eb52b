//! Directory scraping: fetching pages and extracting pharmacy listings.

pub mod config;
pub mod dedup;
mod http_client;
pub mod listing;
pub mod pagination;

pub use config::{DirectoryConfig, ListingSelectors};
pub use dedup::dedup_by_phone;
pub use http_client::{FetchError, HttpClient};
pub use listing::{normalize_phone, ListingParser, ParseError};
pub use pagination::{page_url, ListingFetcher, PageSource, PaginationDriver, ScrapeReport};
