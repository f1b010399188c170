//! # Fetch Configuration Module
//!
//! Configuration for the page-fetch service. One `FetchConfig` is built per
//! process and shared by every fetch, so sessions and connection pools are
//! reused across the source pipelines of a request.
//!
//! Uses a builder pattern like the rest of the crate's configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::fetch::FetchError;

/// Browser-like user agent; several target sites refuse obvious bots.
const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
);

/// Which fetch implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchBackend {
    /// Fetch through the `spider` crawler
    #[default]
    Spider,

    /// Fetch with a plain HTTP client
    Http,
}

impl FromStr for FetchBackend {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spider" => Ok(Self::Spider),
            "http" => Ok(Self::Http),
            other => Err(FetchError::Other(format!("unknown fetch backend '{}'", other))),
        }
    }
}

/// Configuration for the page fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Backend used to load pages
    pub backend: FetchBackend,

    /// User agent to use for requests
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to respect robots.txt
    pub respect_robots_txt: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            respect_robots_txt: false,
        }
    }
}

/// Builder for FetchConfig
#[derive(Debug, Default)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Set the fetch backend
    pub fn backend(mut self, backend: FetchBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set whether to respect robots.txt
    pub fn respect_robots_txt(mut self, respect_robots_txt: bool) -> Self {
        self.config.respect_robots_txt = respect_robots_txt;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl FetchConfig {
    /// Create a new builder
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
