//! Recording fakes for the fetch and extraction seams

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::extract::{
    ChunkingParams, ExtractError, ExtractionRequest, ExtractionSchema, ExtractionService,
};
use crate::fetch::{FetchError, FetchedPage, PageFetcher, select_content};

#[derive(Debug, Clone)]
enum PageStub {
    Html(String),
    Failed,
    Error,
}

/// Page fetcher that serves canned HTML and records every call
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    pages: HashMap<String, PageStub>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`; the requested selector is applied for real.
    pub fn with_html(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), PageStub::Html(html.to_string()));
        self
    }

    /// Report that `url` did not load.
    pub fn with_failed(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), PageStub::Failed);
        self
    }

    /// Fail the fetch of `url` with a transport error.
    pub fn with_error(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), PageStub::Error);
        self
    }

    /// Every `(url, selector)` fetched so far.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedPage, FetchError> {
        self.calls
            .lock()
            .await
            .push((url.to_string(), selector.to_string()));

        match self.pages.get(url) {
            Some(PageStub::Html(html)) => {
                Ok(FetchedPage::loaded(url, select_content(html, selector)?))
            }
            Some(PageStub::Failed) => Ok(FetchedPage::failed(url)),
            Some(PageStub::Error) => Err(FetchError::Other(format!("connection refused: {}", url))),
            None => Err(FetchError::NoPage(url.to_string())),
        }
    }
}

/// A call received by [`FakeExtractionService`]
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Extract {
        schema: &'static str,
        instruction: String,
        content: String,
        chunking: ChunkingParams,
    },
    Generate {
        schema: &'static str,
        prompt: String,
    },
}

impl ServiceCall {
    pub fn schema(&self) -> &'static str {
        match self {
            Self::Extract { schema, .. } | Self::Generate { schema, .. } => schema,
        }
    }
}

/// Extraction service that answers with canned JSON per schema name
#[derive(Debug, Clone, Default)]
pub struct FakeExtractionService {
    responses: HashMap<&'static str, Option<Value>>,
    calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl FakeExtractionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for the schema named `schema` with `value`.
    pub fn with_response(mut self, schema: &'static str, value: Value) -> Self {
        self.responses.insert(schema, Some(value));
        self
    }

    /// Fail requests for the schema named `schema`.
    pub fn with_failure(mut self, schema: &'static str) -> Self {
        self.responses.insert(schema, None);
        self
    }

    pub async fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().await.clone()
    }

    fn answer<T: ExtractionSchema>(&self) -> Result<T, ExtractError> {
        match self.responses.get(T::NAME) {
            Some(Some(value)) => Ok(serde_json::from_value(value.clone())?),
            Some(None) => Err(ExtractError::Other(format!("{} service unavailable", T::NAME))),
            None => Err(ExtractError::Other(format!("no answer for {}", T::NAME))),
        }
    }
}

impl ExtractionService for FakeExtractionService {
    async fn extract<T: ExtractionSchema>(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<T, ExtractError> {
        self.calls.lock().await.push(ServiceCall::Extract {
            schema: T::NAME,
            instruction: request.instruction.to_string(),
            content: request.content.to_string(),
            chunking: request.chunking,
        });
        self.answer()
    }

    async fn generate<T: ExtractionSchema>(&self, prompt: &str) -> Result<T, ExtractError> {
        self.calls.lock().await.push(ServiceCall::Generate {
            schema: T::NAME,
            prompt: prompt.to_string(),
        });
        self.answer()
    }
}
