//! # Source Pipeline
//!
//! Runs one information source from query to result:
//!
//! ```text
//! START -> CHECK_EXISTENCE (if configured) -> EXTRACT -> DONE
//!                 |
//!                 +-- marker found / fetch failed --> DONE(Unavailable)
//! ```
//!
//! The existence check exists to avoid paying for an LLM call on a page that
//! has nothing on it. Prompt-only sources skip fetching altogether and ask the
//! extraction service directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::existence::{FailureMarker, check_existence};
use crate::extract::{
    ExtractionResult, ExtractionSchema, ExtractionService, UnavailableReason, extract_structured,
    generate_structured,
};
use crate::fetch::PageFetcher;
use crate::sources::Category;

/// Where a source gets its content from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTarget {
    /// Fetch a page and extract from the selected subtree
    Page {
        url: String,
        selector: String,
        /// Soft-404 check to run before extraction
        existence_check: Option<FailureMarker>,
    },

    /// Ask the extraction service directly; the instruction is the prompt
    Prompt,
}

/// Immutable input to one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuery {
    pub category: Category,
    pub target: SourceTarget,
    /// Extraction instruction, or the whole prompt for [`SourceTarget::Prompt`]
    pub instruction: String,
    /// Upper bound on list entries kept from the answer
    pub max_items: Option<usize>,
}

impl SourceQuery {
    /// The existence check configured for this query, if any
    pub fn existence_check(&self) -> Option<&FailureMarker> {
        match &self.target {
            SourceTarget::Page {
                existence_check, ..
            } => existence_check.as_ref(),
            SourceTarget::Prompt => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    CheckExistence,
    Extract,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::CheckExistence => "check_existence",
            Self::Extract => "extract",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Composes the existence check and the structured extractor for one source
#[derive(Debug, Clone)]
pub struct SourcePipeline<F, S> {
    fetcher: F,
    service: S,
    chunk_token_threshold: usize,
}

impl<F, S> SourcePipeline<F, S>
where
    F: PageFetcher,
    S: ExtractionService,
{
    pub fn new(fetcher: F, service: S, chunk_token_threshold: usize) -> Self {
        Self {
            fetcher,
            service,
            chunk_token_threshold,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `query` and return a value of schema `T` or `Unavailable`
    #[instrument(skip(self, query), fields(category = %query.category))]
    pub async fn run_source<T: ExtractionSchema>(
        &self,
        query: &SourceQuery,
    ) -> ExtractionResult<T> {
        let mut stage = Stage::Start;
        debug!(%stage, "Running source");

        let result: ExtractionResult<T> = match &query.target {
            SourceTarget::Page {
                url,
                selector,
                existence_check,
            } => {
                if let Some(marker) = existence_check {
                    stage = Stage::CheckExistence;
                    debug!(%stage, url = %url);
                    if !check_existence(&self.fetcher, url, marker).await {
                        info!(url = %url, "No content at source, skipping extraction");
                        return ExtractionResult::unavailable(UnavailableReason::NotFound);
                    }
                }

                stage = Stage::Extract;
                debug!(%stage, url = %url);
                extract_structured(
                    &self.fetcher,
                    &self.service,
                    url,
                    selector,
                    &query.instruction,
                    self.chunk_token_threshold,
                )
                .await
            }
            SourceTarget::Prompt => {
                stage = Stage::Extract;
                debug!(%stage, "Direct prompt, no page fetch");
                generate_structured(&self.service, &query.instruction, query.max_items).await
            }
        };

        let result = match (result, query.max_items) {
            (ExtractionResult::Available { mut data }, Some(max)) => {
                data.truncate(max);
                ExtractionResult::Available { data }
            }
            (result, _) => result,
        };

        stage = Stage::Done;
        debug!(%stage, available = result.is_available());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{AttractionList, EventList, HotelList, Summary};
    use crate::testing::{FakeExtractionService, FakeFetcher, ServiceCall};
    use serde_json::json;

    const WIKI: &str = "https://en.wikivoyage.org/wiki/Bowie";

    fn summary_query(existence_check: Option<FailureMarker>) -> SourceQuery {
        SourceQuery {
            category: Category::Summary,
            target: SourceTarget::Page {
                url: WIKI.to_string(),
                selector: ".mw-content-ltr".to_string(),
                existence_check,
            },
            instruction: "Summarise".to_string(),
            max_items: None,
        }
    }

    fn wiki_marker() -> FailureMarker {
        FailureMarker::new("There is currently no text in this page.", ".noarticletext")
    }

    fn summary_json() -> serde_json::Value {
        json!({
            "history": "Railroad town.",
            "transportation": "MARC trains.",
            "things_to_do": "Belair Mansion.",
            "food": "Crab cakes.",
            "hotels": "Little information."
        })
    }

    #[tokio::test]
    async fn test_missing_page_never_reaches_extractor() {
        let fetcher = FakeFetcher::new().with_html(
            WIKI,
            r#"<div class="noarticletext">There is currently no text in this page.</div>"#,
        );
        let service = FakeExtractionService::new().with_response("summary", summary_json());
        let pipeline = SourcePipeline::new(fetcher, service, 10_000);

        let result: ExtractionResult<Summary> =
            pipeline.run_source(&summary_query(Some(wiki_marker()))).await;

        assert_eq!(result.reason(), Some(UnavailableReason::NotFound));
        assert!(pipeline.service().calls().await.is_empty());
        assert_eq!(pipeline.fetcher().calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_page_is_checked_then_extracted() {
        let fetcher = FakeFetcher::new().with_html(
            WIKI,
            r#"<div class="mw-content-ltr"><p>Bowie is a city.</p></div>"#,
        );
        let service = FakeExtractionService::new().with_response("summary", summary_json());
        let pipeline = SourcePipeline::new(fetcher, service, 10_000);

        let result: ExtractionResult<Summary> =
            pipeline.run_source(&summary_query(Some(wiki_marker()))).await;

        assert!(result.is_available());
        let selectors: Vec<String> = pipeline
            .fetcher()
            .calls()
            .await
            .into_iter()
            .map(|(_, selector)| selector)
            .collect();
        assert_eq!(selectors, vec![".noarticletext", ".mw-content-ltr"]);
    }

    #[tokio::test]
    async fn test_without_check_extraction_is_always_attempted() {
        let hotels = "https://www.booking.com/searchresults.html?ss=Bowie";
        let fetcher = FakeFetcher::new().with_html(hotels, "<p>Unexpected layout</p>");
        let service = FakeExtractionService::new().with_response(
            "hotels",
            json!({ "hotels": [{
                "name": "Bowie Inn", "review_score": 8.1, "total_price": "$700",
                "per_night_price": "$100", "distance": "1 mile", "extra_info": "",
                "relevant": true
            }]}),
        );
        let pipeline = SourcePipeline::new(fetcher, service, 10_000);
        let query = SourceQuery {
            category: Category::Hotels,
            target: SourceTarget::Page {
                url: hotels.to_string(),
                selector: ".cca574b93c".to_string(),
                existence_check: None,
            },
            instruction: "Hotels".to_string(),
            max_items: None,
        };

        let result: ExtractionResult<HotelList> = pipeline.run_source(&query).await;

        assert!(result.data().unwrap().hotels[0].relevant);
        assert_eq!(pipeline.fetcher().calls().await.len(), 1);
        assert_eq!(pipeline.service().calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_target_skips_fetching() {
        let attractions: Vec<_> = (0..12)
            .map(|i| {
                json!({
                    "name": format!("Sight {}", i),
                    "location": "Carson City",
                    "description": "Nice"
                })
            })
            .collect();
        let service = FakeExtractionService::new()
            .with_response("attractions", json!({ "attractions": attractions }));
        let pipeline = SourcePipeline::new(FakeFetcher::new(), service, 10_000);
        let query = SourceQuery {
            category: Category::Attractions,
            target: SourceTarget::Prompt,
            instruction: "Describe attractions".to_string(),
            max_items: Some(10),
        };

        let result: ExtractionResult<AttractionList> = pipeline.run_source(&query).await;

        assert_eq!(result.data().unwrap().attractions.len(), 10);
        assert!(pipeline.fetcher().calls().await.is_empty());
        assert!(matches!(pipeline.service().calls().await[0], ServiceCall::Generate { .. }));
    }

    #[tokio::test]
    async fn test_page_results_are_truncated_too() {
        let events = "https://www.eventbrite.com/d/md--bowie/all-events/";
        let listed: Vec<_> = (0..5)
            .map(|i| {
                json!({
                    "name": format!("Event {}", i),
                    "time": "Fri",
                    "area": "Bowie",
                    "relevant": false
                })
            })
            .collect();
        let fetcher =
            FakeFetcher::new().with_html(events, r#"<ul class="list"><li>events</li></ul>"#);
        let service =
            FakeExtractionService::new().with_response("events", json!({ "events": listed }));
        let pipeline = SourcePipeline::new(fetcher, service, 10_000);
        let query = SourceQuery {
            category: Category::Events,
            target: SourceTarget::Page {
                url: events.to_string(),
                selector: ".list".to_string(),
                existence_check: None,
            },
            instruction: "Events".to_string(),
            max_items: Some(3),
        };

        let result: ExtractionResult<EventList> = pipeline.run_source(&query).await;
        assert_eq!(result.data().unwrap().events.len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_schema_equivalent() {
        let fetcher = FakeFetcher::new().with_html(
            WIKI,
            r#"<div class="mw-content-ltr"><p>Bowie is a city.</p></div>"#,
        );
        let service = FakeExtractionService::new().with_response("summary", summary_json());
        let pipeline = SourcePipeline::new(fetcher, service, 10_000);
        let query = summary_query(Some(wiki_marker()));

        let first: ExtractionResult<Summary> = pipeline.run_source(&query).await;
        let second: ExtractionResult<Summary> = pipeline.run_source(&query).await;

        assert_eq!(first, second);
        let calls = pipeline.service().calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn test_existence_check_accessor() {
        assert_eq!(summary_query(Some(wiki_marker())).existence_check(), Some(&wiki_marker()));
        assert_eq!(summary_query(None).existence_check(), None);
    }
}
