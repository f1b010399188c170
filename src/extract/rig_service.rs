//! Extraction service backed by rig's structured extractor
//!
//! rig's extractor exposes the target schema to the model as a `submit` tool
//! and deserialises the tool arguments, so the model's answer is always
//! parsed against the schema before it reaches the pipeline.

use rig::completion::CompletionModel;
use rig::extractor::{ExtractionError, ExtractorBuilder};
use tracing::{Instrument, debug, info_span, instrument};

use crate::extract::chunking::chunk_content;
use crate::extract::error::ExtractError;
use crate::extract::schema::ExtractionSchema;
use crate::extract::service::{ExtractionRequest, ExtractionService};
use crate::model::Client;

const PROMPT_PREAMBLE: &str = "Answer the request from your own knowledge. \
Submit every item you describe through the `submit` function.";

/// [`ExtractionService`] implementation over any rig completion model
#[derive(Clone)]
pub struct RigExtractionService<C>
where
    C: CompletionModel,
{
    client: Client<C>,
}

impl<C> RigExtractionService<C>
where
    C: CompletionModel,
{
    pub fn new(client: Client<C>) -> Self {
        Self { client }
    }
}

impl<C> ExtractionService for RigExtractionService<C>
where
    C: CompletionModel + 'static,
{
    #[instrument(
        skip(self, request),
        fields(schema = T::NAME, chunking = request.chunking.apply_chunking)
    )]
    async fn extract<T: ExtractionSchema>(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<T, ExtractError> {
        let extractor = ExtractorBuilder::new(self.client.extraction().clone())
            .preamble(request.instruction)
            .build();

        let chunks = chunk_content(request.content, &request.chunking);
        debug!("Extracting {} from {} chunk(s)", T::NAME, chunks.len());

        let mut merged: Option<T> = None;
        for (index, chunk) in chunks.iter().enumerate() {
            let value: T = extractor
                .extract(chunk.as_str())
                .instrument(info_span!("extract_chunk", index))
                .await?;
            merged = Some(match merged {
                Some(acc) => acc.merge(value),
                None => value,
            });
        }

        merged.ok_or(ExtractError::Service(ExtractionError::NoData))
    }

    #[instrument(skip(self, prompt), fields(schema = T::NAME))]
    async fn generate<T: ExtractionSchema>(&self, prompt: &str) -> Result<T, ExtractError> {
        let extractor = ExtractorBuilder::new(self.client.prompt().clone())
            .preamble(PROMPT_PREAMBLE)
            .build();

        let value: T = extractor.extract(prompt).await?;
        Ok(value)
    }
}
