//! Plain HTTP page fetcher
//!
//! No JavaScript rendering, so this only suits sites that serve their content
//! in the initial HTML.

use reqwest::Client as ReqwestClient;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::fetch::content::select_content;
use crate::fetch::error::FetchError;
use crate::fetch::{FetchConfig, FetchedPage, PageFetcher};

/// Page fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    /// Create a fetcher from the fetch configuration
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url)?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {} returned {}", url, status);
            return Ok(FetchedPage::failed(url));
        }

        let html = response.text().await?;
        let content = select_content(&html, selector)?;
        debug!("Selected {} bytes from {}", content.len(), url);

        Ok(FetchedPage::loaded(url, content))
    }
}
