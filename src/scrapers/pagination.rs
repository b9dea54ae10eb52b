//! Page-by-page directory traversal.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::ProgressBar;
use tracing::{info, warn};
use url::Url;

use super::config::DirectoryConfig;
use super::http_client::{FetchError, HttpClient};
use super::listing::ListingParser;
use crate::models::RawRecord;

/// Something that can hand back the markup of a directory page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL of the given page, used for provenance on every record.
    fn page_url(&self, page: u32) -> String;

    /// Fetch one page. A non-2xx status and a transport error both fail.
    async fn fetch_page(&self, page: u32) -> Result<String, FetchError>;
}

/// Build a page URL by appending the page number to the base.
pub fn page_url(base_url: &str, page: u32, first_page_bare: bool) -> String {
    if first_page_bare && page == 1 {
        base_url.to_string()
    } else {
        format!("{}{}", base_url, page)
    }
}

/// Fetches directory pages over HTTP.
pub struct ListingFetcher {
    client: HttpClient,
    base_url: String,
    first_page_bare: bool,
}

impl ListingFetcher {
    pub fn new(config: &DirectoryConfig) -> Result<Self, FetchError> {
        Url::parse(&config.base_url).map_err(|_| FetchError::InvalidUrl(config.base_url.clone()))?;
        let client = HttpClient::new(
            Duration::from_secs(config.timeout_secs),
            config.user_agent.as_deref(),
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            first_page_bare: config.first_page_bare,
        })
    }
}

#[async_trait]
impl PageSource for ListingFetcher {
    fn page_url(&self, page: u32) -> String {
        page_url(&self.base_url, page, self.first_page_bare)
    }

    async fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
        self.client.get_text(&self.page_url(page)).await
    }
}

/// Result of a pagination run.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Records in page order, then listing order within a page.
    pub records: Vec<RawRecord>,
    pub pages_visited: u32,
    /// Pages that failed to fetch and contributed nothing.
    pub failed_pages: Vec<u32>,
}

/// Walks a page range, fetching and parsing each page in turn.
pub struct PaginationDriver<'a, S: PageSource + ?Sized> {
    source: &'a S,
    parser: &'a ListingParser,
    page_delay: Duration,
    progress: ProgressBar,
}

impl<'a, S: PageSource + ?Sized> PaginationDriver<'a, S> {
    pub fn new(source: &'a S, parser: &'a ListingParser, page_delay: Duration) -> Self {
        Self {
            source,
            parser,
            page_delay,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-page progress on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Visit `pages` in increasing order. A failing page is logged and
    /// skipped; the delay applies after every page regardless.
    pub async fn run(&self, pages: RangeInclusive<u32>) -> ScrapeReport {
        let mut report = ScrapeReport::default();
        if let Some(total) = pages.end().checked_sub(*pages.start()) {
            self.progress.set_length(u64::from(total) + 1);
        }

        for page in pages {
            let url = self.source.page_url(page);
            report.pages_visited += 1;

            match self.source.fetch_page(page).await {
                Ok(html) => {
                    let records = self.parser.parse_page(&html, page, &url);
                    info!("Page {}: {} listings ({})", page, records.len(), url);
                    report.records.extend(records);
                }
                Err(e) => {
                    warn!("Page {} skipped: {}", page, e);
                    report.failed_pages.push(page);
                }
            }

            self.progress.set_message(format!("{} pharmacies", report.records.len()));
            self.progress.inc(1);
            tokio::time::sleep(self.page_delay).await;
        }

        if !report.failed_pages.is_empty() {
            warn!(
                "{} of {} pages failed: {:?}",
                report.failed_pages.len(),
                report.pages_visited,
                report.failed_pages
            );
        }
        self.progress.finish_and_clear();
        report
    }
}
