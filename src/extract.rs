//! # Structured Extraction Module
//!
//! Turns fetched page content into schema-conforming values through an
//! LLM-backed extraction service.
//!
//! ## Key Components
//!
//! - `ExtractionSchema`: The canonical schema of each source category
//! - `ExtractionService`: The service seam (`RigExtractionService` in production)
//! - `extract_structured`: Fetch, convert to markdown, and extract
//! - `generate_structured`: Direct-prompt generation without a page fetch
//! - `ExtractionResult`: A valid value or the explicit `Unavailable` sentinel
//!
//! Every failure along the way (fetch, service, schema mismatch, failed
//! validation, empty answer) ends up as `ExtractionResult::Unavailable` with a
//! reason. Nothing malformed is passed on.

mod chunking;
mod error;
mod extractor;
mod rig_service;
mod schema;
mod service;

pub use chunking::{
    ChunkingParams, DEFAULT_CHUNK_TOKEN_THRESHOLD, WORD_TOKEN_RATE, chunk_content, estimate_tokens,
};
pub use error::ExtractError;
pub use extractor::{extract_structured, generate_structured};
pub use rig_service::RigExtractionService;
pub use schema::{
    Attraction, AttractionList, Event, EventList, ExtractionSchema, Hotel, HotelList,
    LITTLE_INFORMATION, Summary, TravelPath, TravelPathList,
};
pub use service::{ExtractionRequest, ExtractionService};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Why a source category has no data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The page could not be fetched or did not load
    FetchFailed,
    /// The page loaded but the site reported that it has no content
    NotFound,
    /// The extraction service failed
    ExtractionFailed,
    /// The extraction service answered with data that does not fit the schema
    Malformed,
    /// The answer was valid but carried no data
    Empty,
}

/// Outcome of one source pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult<T> {
    /// A schema-conforming value
    Available { data: T },
    /// No usable data could be obtained
    Unavailable { reason: UnavailableReason },
}

impl<T> ExtractionResult<T> {
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// The value, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Available { data } => Some(data),
            Self::Unavailable { .. } => None,
        }
    }

    /// The reason, if unavailable
    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::Available { .. } => None,
            Self::Unavailable { reason } => Some(*reason),
        }
    }
}

impl<T: ExtractionSchema> ExtractionResult<T> {
    /// Normalise a service answer: anything invalid or empty becomes `Unavailable`
    pub fn from_extraction(result: Result<T, ExtractError>) -> Self {
        let value = match result {
            Ok(value) => value,
            Err(e) if e.is_malformed() => {
                warn!("Malformed {} extraction: {}", T::NAME, e);
                return Self::unavailable(UnavailableReason::Malformed);
            }
            Err(e) => {
                warn!("{} extraction failed: {}", T::NAME, e);
                return Self::unavailable(UnavailableReason::ExtractionFailed);
            }
        };

        if let Err(e) = value.validate() {
            warn!("Rejected {} extraction: {}", T::NAME, e);
            return Self::unavailable(UnavailableReason::Malformed);
        }

        if value.is_empty() {
            warn!("{} extraction returned no data", T::NAME);
            return Self::unavailable(UnavailableReason::Empty);
        }

        Self::Available { data: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str) -> Event {
        Event {
            name: name.to_string(),
            time: "Fri 8pm".to_string(),
            area: "Old Town".to_string(),
            relevant: true,
        }
    }

    #[test]
    fn test_from_extraction_accepts_valid_value() {
        let result = ExtractionResult::from_extraction(Ok(EventList {
            events: vec![event("Jazz")],
        }));
        assert!(result.is_available());
        assert_eq!(result.data().unwrap().events.len(), 1);
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_from_extraction_normalises_failures() {
        let invalid = ExtractionResult::from_extraction(Ok(EventList { events: vec![event(" ")] }));
        assert_eq!(invalid.reason(), Some(UnavailableReason::Malformed));

        let empty = ExtractionResult::from_extraction(Ok(EventList { events: vec![] }));
        assert_eq!(empty.reason(), Some(UnavailableReason::Empty));

        let failed: ExtractionResult<EventList> =
            ExtractionResult::from_extraction(Err(ExtractError::Other("quota".to_string())));
        assert_eq!(failed.reason(), Some(UnavailableReason::ExtractionFailed));

        let schema_error = serde_json::from_value::<EventList>(json!({ "events": 3 })).unwrap_err();
        let malformed: ExtractionResult<EventList> =
            ExtractionResult::from_extraction(Err(ExtractError::Schema(schema_error)));
        assert_eq!(malformed.reason(), Some(UnavailableReason::Malformed));
    }

    #[test]
    fn test_serialized_shape() {
        let available = ExtractionResult::Available {
            data: EventList {
                events: vec![event("Jazz")],
            },
        };
        let value = serde_json::to_value(&available).unwrap();
        assert_eq!(value["status"], "available");
        assert_eq!(value["data"]["events"][0]["name"], "Jazz");

        let unavailable: ExtractionResult<EventList> =
            ExtractionResult::unavailable(UnavailableReason::NotFound);
        assert_eq!(
            serde_json::to_value(&unavailable).unwrap(),
            json!({ "status": "unavailable", "reason": "not_found" })
        );
    }
}
