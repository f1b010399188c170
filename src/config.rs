//! # Application Configuration
//!
//! `AppConfig` is built once at process start and passed into the clients,
//! the pipeline, and the aggregator. Nothing in the crate reads the
//! environment on its own.
//!
//! ## Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `GEMINI_API_KEY` | required |
//! | `WAYFARER_EXTRACTION_MODEL` | `gemini-2.0-flash` |
//! | `WAYFARER_PROMPT_MODEL` | `gemini-2.5-flash` |
//! | `WAYFARER_REQUESTS_PER_MINUTE` | `30` |
//! | `WAYFARER_CHUNK_TOKEN_THRESHOLD` | `10000` |
//! | `WAYFARER_FETCH_BACKEND` | `spider` |
//! | `WAYFARER_USER_AGENT` | browser-like UA |
//! | `WAYFARER_FETCH_TIMEOUT_SECS` | `30` |
//! | `WAYFARER_CONCURRENT` | `false` |

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::extract::DEFAULT_CHUNK_TOKEN_THRESHOLD;
use crate::fetch::FetchConfig;
use crate::sources::SourceCatalog;

/// LLM model selection and quota
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model used to extract structured data from page content
    pub extraction_model: String,

    /// Model used for direct-prompt generation
    pub prompt_model: String,

    /// Client-side request quota per model
    pub requests_per_minute: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            extraction_model: "gemini-2.0-flash".to_string(),
            prompt_model: "gemini-2.5-flash".to_string(),
            requests_per_minute: 30,
        }
    }
}

/// Behaviour of the source pipelines and the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Estimated token count above which page content is chunked
    pub chunk_token_threshold: usize,

    /// Run the category pipelines concurrently instead of one after another
    pub concurrent: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_token_threshold: DEFAULT_CHUNK_TOKEN_THRESHOLD,
            concurrent: false,
        }
    }
}

/// Complete process configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Gemini API key
    pub gemini_api_key: String,

    pub model: ModelConfig,

    pub fetch: FetchConfig,

    pub pipeline: PipelineConfig,

    pub sources: SourceCatalog,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("gemini_api_key", &"<redacted>")
            .field("model", &self.model)
            .field("fetch", &self.fetch)
            .field("pipeline", &self.pipeline)
            .field("sources", &self.sources)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with defaults for everything but the API key
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            model: ModelConfig::default(),
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
            sources: SourceCatalog::default(),
        }
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY must be set".to_string()))?;

        let mut config = Self::new(api_key);

        if let Some(model) = lookup("WAYFARER_EXTRACTION_MODEL") {
            config.model.extraction_model = model;
        }
        if let Some(model) = lookup("WAYFARER_PROMPT_MODEL") {
            config.model.prompt_model = model;
        }
        if let Some(rpm) = parse_var::<u32>(&lookup, "WAYFARER_REQUESTS_PER_MINUTE")? {
            if rpm == 0 {
                return Err(Error::Config(
                    "WAYFARER_REQUESTS_PER_MINUTE must be greater than zero".to_string(),
                ));
            }
            config.model.requests_per_minute = rpm;
        }
        if let Some(threshold) = parse_var(&lookup, "WAYFARER_CHUNK_TOKEN_THRESHOLD")? {
            config.pipeline.chunk_token_threshold = threshold;
        }
        if let Some(concurrent) = parse_var(&lookup, "WAYFARER_CONCURRENT")? {
            config.pipeline.concurrent = concurrent;
        }
        config.fetch = Self::fetch_from_lookup(&lookup)?;

        Ok(config)
    }

    /// Load only the fetch settings from the process environment
    ///
    /// Needs no API key, for commands that never call the LLM.
    pub fn fetch_from_env() -> Result<FetchConfig> {
        let _ = dotenvy::dotenv();
        Self::fetch_from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Load only the fetch settings through an arbitrary variable lookup
    pub fn fetch_from_lookup<F>(lookup: &F) -> Result<FetchConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut fetch = FetchConfig::default();
        if let Some(backend) = lookup("WAYFARER_FETCH_BACKEND") {
            fetch.backend = backend.parse()?;
        }
        if let Some(user_agent) = lookup("WAYFARER_USER_AGENT") {
            fetch.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var(lookup, "WAYFARER_FETCH_TIMEOUT_SECS")? {
            fetch.timeout_secs = timeout;
        }
        Ok(fetch)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("{} is invalid: {}", key, e)))
        })
        .transpose()
}
