//! The extraction service seam
//!
//! The pipeline only knows this trait. The production implementation is
//! [`RigExtractionService`](super::RigExtractionService); tests substitute
//! recording fakes.

use std::future::Future;

use serde::Serialize;

use crate::extract::chunking::ChunkingParams;
use crate::extract::error::ExtractError;
use crate::extract::schema::ExtractionSchema;

/// Everything the service needs for one page extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRequest<'a> {
    /// What to pull out of the content
    pub instruction: &'a str,

    /// Page content as markdown
    pub content: &'a str,

    /// How to split the content before extraction
    pub chunking: ChunkingParams,
}

/// An LLM-backed service that turns text into schema-conforming values
pub trait ExtractionService: Send + Sync {
    /// Extract a `T` from page content following the request's instruction
    fn extract<T: ExtractionSchema>(
        &self,
        request: ExtractionRequest<'_>,
    ) -> impl Future<Output = Result<T, ExtractError>> + Send;

    /// Ask for a `T` from a natural-language prompt alone, without page content
    fn generate<T: ExtractionSchema>(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<T, ExtractError>> + Send;
}
