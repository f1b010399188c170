//! Structured extractor: fetch a page and extract a schema value from it

use tracing::{debug, instrument, warn};

use crate::extract::chunking::ChunkingParams;
use crate::extract::schema::ExtractionSchema;
use crate::extract::service::{ExtractionRequest, ExtractionService};
use crate::extract::{ExtractionResult, UnavailableReason};
use crate::fetch::PageFetcher;

/// Fetch `url`, keep the `selector` subtree, and extract a `T` from it
///
/// The page is converted to link- and image-free markdown before it is sent
/// to the service. Chunking is switched on only when the markdown is larger
/// than `chunk_token_threshold` estimated tokens.
///
/// # Returns
///
/// The extracted value, or `Unavailable` when the fetch fails, the service
/// fails, or the answer does not validate.
#[instrument(skip(fetcher, service, instruction), fields(schema = T::NAME))]
pub async fn extract_structured<T, F, S>(
    fetcher: &F,
    service: &S,
    url: &str,
    selector: &str,
    instruction: &str,
    chunk_token_threshold: usize,
) -> ExtractionResult<T>
where
    T: ExtractionSchema,
    F: PageFetcher,
    S: ExtractionService,
{
    let page = match fetcher.fetch(url, selector).await {
        Ok(page) if page.success => page,
        Ok(_) => {
            warn!(url, "Page did not load, skipping extraction");
            return ExtractionResult::unavailable(UnavailableReason::FetchFailed);
        }
        Err(e) => {
            warn!(url, error = %e, "Fetch failed, skipping extraction");
            return ExtractionResult::unavailable(UnavailableReason::FetchFailed);
        }
    };

    let markdown = page.markdown();
    let chunking = ChunkingParams::for_content(&markdown, chunk_token_threshold);
    debug!(
        "Sending {} bytes of markdown (chunking: {})",
        markdown.len(),
        chunking.apply_chunking
    );

    let request = ExtractionRequest {
        instruction,
        content: &markdown,
        chunking,
    };
    ExtractionResult::from_extraction(service.extract(request).await)
}

/// Ask the service for a `T` from a prompt alone, keeping at most `max_items` entries
#[instrument(skip(service, prompt), fields(schema = T::NAME))]
pub async fn generate_structured<T, S>(
    service: &S,
    prompt: &str,
    max_items: Option<usize>,
) -> ExtractionResult<T>
where
    T: ExtractionSchema,
    S: ExtractionService,
{
    let result = service.generate::<T>(prompt).await.map(|mut value| {
        if let Some(max) = max_items {
            value.truncate(max);
        }
        value
    });
    ExtractionResult::from_extraction(result)
}
