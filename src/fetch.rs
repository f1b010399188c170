//! # Page Fetch Module
//!
//! This module is the page-fetch service the extraction pipeline talks to. It
//! loads a single page, narrows it down to the subtree matched by a CSS
//! selector, and hands back the selected HTML together with a success flag.
//!
//! ## Key Components
//!
//! - `PageFetcher`: The trait every fetch backend implements
//! - `FetchedPage`: The result of a fetch (`success` plus selected content)
//! - `SpiderFetcher`: Single-page fetches through the `spider` crawler
//! - `HttpFetcher`: Plain `reqwest` fetches for static sites
//! - `Fetcher`: Runtime dispatch over the configured backend
//! - Content utilities for converting selected HTML into compact markdown
//!
//! Transport failures are reported as `FetchError`; pages that load with a
//! non-success status come back as `FetchedPage { success: false, .. }`.
//! Callers in the pipeline treat both the same way.

mod config;
mod content;
mod error;
mod http_fetcher;
mod spider_fetcher;

pub use config::{FetchBackend, FetchConfig, FetchConfigBuilder};
pub use content::{html_to_markdown, select_content, visible_text};
pub use error::FetchError;
pub use http_fetcher::HttpFetcher;
pub use spider_fetcher::SpiderFetcher;

use serde::{Deserialize, Serialize};
use std::future::Future;

/// A page loaded by a [`PageFetcher`], restricted to a selector's subtree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// Whether the page loaded successfully
    pub success: bool,

    /// HTML of every element matching the selector, in document order
    pub content: String,
}

impl FetchedPage {
    /// A successfully loaded page
    pub fn loaded(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: true,
            content: content.into(),
        }
    }

    /// A page that did not load
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            content: String::new(),
        }
    }

    /// The selected content as link- and image-free markdown
    pub fn markdown(&self) -> String {
        html_to_markdown(&self.content)
    }

    /// The visible text of the selected content
    pub fn text(&self) -> String {
        visible_text(&self.content)
    }
}

/// A service that loads a page and restricts it to a selector's subtree
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and keep only the elements matching `selector`
    fn fetch(
        &self,
        url: &str,
        selector: &str,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Fetch backend chosen at runtime from [`FetchConfig::backend`]
#[derive(Debug, Clone)]
pub enum Fetcher {
    Spider(SpiderFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    /// Build the backend named by the configuration
    pub fn from_config(config: FetchConfig) -> Result<Self, FetchError> {
        match config.backend {
            FetchBackend::Spider => Ok(Self::Spider(SpiderFetcher::new(config))),
            FetchBackend::Http => Ok(Self::Http(HttpFetcher::new(config)?)),
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedPage, FetchError> {
        match self {
            Self::Spider(fetcher) => fetcher.fetch(url, selector).await,
            Self::Http(fetcher) => fetcher.fetch(url, selector).await,
        }
    }
}
