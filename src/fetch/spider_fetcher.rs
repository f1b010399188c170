//! Integration with spider library for single-page fetches

use spider::website::Website;
use tracing::{debug, info, instrument, warn};

use crate::fetch::content::select_content;
use crate::fetch::error::FetchError;
use crate::fetch::{FetchConfig, FetchedPage, PageFetcher};

/// Page fetcher that loads exactly one page through the `spider` crawler
///
/// The configuration is built once and reused for every fetch, which plays the
/// part of a long-lived browser session.
#[derive(Debug, Clone)]
pub struct SpiderFetcher {
    config: FetchConfig,
}

impl SpiderFetcher {
    /// Create a fetcher from the fetch configuration
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    fn website(&self, url: &str) -> Website {
        let mut website = Website::new(url);
        website
            .configuration
            .with_respect_robots_txt(self.config.respect_robots_txt)
            .with_user_agent(Some(&self.config.user_agent))
            .with_request_timeout(Some(self.config.timeout()))
            .with_depth(0)
            .with_limit(1);
        website
    }
}

impl PageFetcher for SpiderFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedPage, FetchError> {
        let mut website = self.website(url);
        website.scrape().await;

        let page = website
            .get_pages()
            .and_then(|pages| pages.first())
            .ok_or_else(|| FetchError::NoPage(url.to_string()))?;

        let html = page.get_html();
        if !page.status_code.is_success() || html.is_empty() {
            warn!("Fetch of {} failed with status {}", url, page.status_code);
            return Ok(FetchedPage::failed(url));
        }

        let content = select_content(&html, selector)?;
        debug!("Selected {} of {} bytes", content.len(), html.len());
        info!("Fetched {}", url);

        Ok(FetchedPage::loaded(url, content))
    }
}

