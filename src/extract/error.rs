//! Error types for the extraction module

use rig::completion::PromptError;
use rig::extractor::ExtractionError;
use rig::tool::{ToolError, ToolSetError};
use thiserror::Error;

/// Error type for structured extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extraction service failed or returned no data
    #[error("Extraction service error: {0}")]
    Service(#[from] ExtractionError),

    /// The service answered with JSON that does not fit the schema
    #[error("Schema mismatch: {0}")]
    Schema(#[from] serde_json::Error),

    /// The answer fit the schema but its values are unusable
    #[error("Invalid extraction: {0}")]
    Invalid(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Whether the error means the service produced data of the wrong shape
    ///
    /// rig deserialises the `submit` tool arguments inside the tool call, so a
    /// shape mismatch usually arrives wrapped in a tool error.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Invalid(_) => true,
            Self::Service(ExtractionError::DeserializationError(_)) => true,
            Self::Service(ExtractionError::PromptError(PromptError::ToolError(tool_error))) => {
                matches!(
                    tool_error,
                    ToolSetError::JsonError(_)
                        | ToolSetError::ToolCallError(ToolError::JsonError(_))
                )
            }
            _ => false,
        }
    }
}
