//! Listing extraction from directory page markup.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use super::config::ListingSelectors;
use crate::models::RawRecord;

/// Errors building a parser from configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid {field} selector: {selector:?}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
    },
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|_| ParseError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

/// Extracts pharmacy listings from one directory page.
#[derive(Debug)]
pub struct ListingParser {
    container: Selector,
    link: Selector,
    name: Selector,
    locality: Selector,
    phone: Selector,
    category_path: String,
    fallback_locality: String,
}

impl ListingParser {
    pub fn new(config: &ListingSelectors) -> Result<Self, ParseError> {
        Ok(Self {
            container: compile("container", &config.container)?,
            link: compile("link", &config.link)?,
            name: compile("name", &config.name)?,
            locality: compile("locality", &config.locality)?,
            phone: compile("phone", &config.phone)?,
            category_path: config.category_path.clone(),
            fallback_locality: config.fallback_locality.clone(),
        })
    }

    /// Parse a page and collect its listings in document order.
    pub fn parse_page(&self, html: &str, page: u32, url: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        self.listings(&document, page, url).collect()
    }

    /// Lazily walk the listings of an already parsed page.
    pub fn listings<'a>(
        &'a self,
        document: &'a Html,
        page: u32,
        url: &'a str,
    ) -> impl Iterator<Item = RawRecord> + 'a {
        document
            .select(&self.container)
            .filter_map(move |listing| self.parse_listing(listing, page, url))
    }

    fn parse_listing(&self, listing: ElementRef<'_>, page: u32, url: &str) -> Option<RawRecord> {
        let href = listing.select(&self.link).next()?.value().attr("href")?;
        if !href.contains(&self.category_path) {
            debug!("Skipping non-pharmacy listing {}", href);
            return None;
        }

        let name = listing
            .select(&self.name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty());
        let Some(name) = name else {
            debug!("Skipping unnamed listing {}", href);
            return None;
        };

        let locality = listing
            .select(&self.locality)
            .next()
            .map(element_text)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.fallback_locality.clone());

        let phone = listing
            .select(&self.phone)
            .next()
            .map(|el| normalize_phone(&element_text(el)))
            .unwrap_or_default();

        Some(RawRecord {
            name,
            phone,
            locality,
            source_page: page,
            source_url: url.to_string(),
        })
    }
}

/// Visible text of an element, whitespace collapsed (line breaks included).
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip everything but digits; ten digits become `0X XX XX XX XX`.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 {
        return digits;
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| std::str::from_utf8(pair).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}
