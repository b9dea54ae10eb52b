//! Directory scraper configuration types.
//!
//! Every field has a default matching the Kénitra pharmacy listing on
//! annuaire-gratuit.ma, so an empty config file scrapes that directory.

use serde::{Deserialize, Serialize};

/// Where and how to fetch directory pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Page URLs are this base with the page number appended.
    pub base_url: String,
    /// Fetch page 1 from the bare base URL instead of `{base_url}1`.
    pub first_page_bare: bool,
    pub start_page: u32,
    /// Last page to fetch, inclusive.
    pub end_page: u32,
    /// Courtesy delay after every page, successful or not.
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    /// User agent configuration.
    /// - None: desktop Chrome user agent
    /// - "rotate": cycle through common browsers, one per request
    /// - Any other string: used as is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Drop later listings whose phone number was already seen.
    pub dedup_by_phone: bool,
    pub listing: ListingSelectors,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.annuaire-gratuit.ma/recherche/pharmacies-ville-kénitra-pg"
                .to_string(),
            first_page_bare: false,
            start_page: 1,
            end_page: 33,
            page_delay_ms: 1000,
            timeout_secs: 10,
            user_agent: None,
            dedup_by_phone: false,
            listing: ListingSelectors::default(),
        }
    }
}

/// CSS selectors and filters used to pull listings out of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per listing.
    pub container: String,
    /// First match inside a listing is checked against `category_path`.
    pub link: String,
    /// The directory mixes entity types; only links under this path count.
    pub category_path: String,
    pub name: String,
    pub locality: String,
    pub phone: String,
    /// Locality used when a listing does not name one.
    pub fallback_locality: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: "li.ag_listing_item".to_string(),
            link: "a[href]".to_string(),
            category_path: "/pharmacies/".to_string(),
            name: r#"h3[itemprop="name"]"#.to_string(),
            locality: r#"span[itemprop="addressRegion"]"#.to_string(),
            phone: r#"span[itemprop="telephone"]"#.to_string(),
            fallback_locality: "Kénitra".to_string(),
        }
    }
}
