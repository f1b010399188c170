//! # LLM Client Module
//!
//! This module provides the completion models behind the extraction service,
//! with built-in rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `Client`: Holds the extraction model and the direct-prompt model
//! - `RateLimitedCompletionModel`: A wrapper that adds rate limiting to any completion model
//!
//! Each model gets its own limiter, matching the provider's per-model quotas.

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{completion::CompletionModel, providers::gemini};

use crate::config::ModelConfig;

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    extraction_model: C,
    prompt_model: C,
}

/// Raw provider response as seen through the rate-limited wrapper
#[derive(Debug, Clone)]
pub struct RateLimitResponse<T> {
    response: T,
}

impl<T> RateLimitResponse<T> {
    pub fn new(response: T) -> Self {
        Self { response }
    }

    pub fn inner(&self) -> &T {
        &self.response
    }
}

impl Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    pub fn new_gemini(gemini_api_key: &str, config: &ModelConfig) -> Self {
        let gemini_client = gemini::Client::new(gemini_api_key);
        Self::from_gemini_client(gemini_client, config)
    }

    pub fn from_gemini_client(gemini_client: gemini::Client, config: &ModelConfig) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        let extraction_model = RateLimitedCompletionModel::new(
            gemini_client.completion_model(&config.extraction_model),
            RateLimiter::direct(quota),
        );
        let prompt_model = RateLimitedCompletionModel::new(
            gemini_client.completion_model(&config.prompt_model),
            RateLimiter::direct(quota),
        );
        Self {
            extraction_model,
            prompt_model,
        }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    pub fn new(extraction_model: C, prompt_model: C) -> Self {
        Self {
            extraction_model,
            prompt_model,
        }
    }

    pub fn extraction(&self) -> &C {
        &self.extraction_model
    }

    pub fn prompt(&self) -> &C {
        &self.prompt_model
    }
}
