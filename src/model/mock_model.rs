//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. Responses are queued up front; the extraction tests queue
//! `submit` tool calls, which is how rig's extractor receives structured data.

use std::collections::VecDeque;
use std::sync::Arc;

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<Result<OneOrMany<AssistantContent>, String>>,
    preambles: Vec<Option<String>>,
}

/// A mock completion model that replays queued responses in order.
/// Once the queue is empty it answers with empty text.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    state: Arc<Mutex<MockState>>,
}

impl MockCompletionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text answer.
    pub async fn set_text_response(&self, text: &str) {
        self.push(Ok(OneOrMany::one(AssistantContent::text(text)))).await;
    }

    /// Queue an answer that calls the extractor's `submit` tool with `arguments`.
    pub async fn push_submit(&self, arguments: Value) {
        let call = AssistantContent::tool_call("call_0", "submit", arguments);
        self.push(Ok(OneOrMany::one(call))).await;
    }

    /// Queue a provider failure.
    pub async fn push_error(&self, message: &str) {
        self.push(Err(message.to_string())).await;
    }

    /// Number of completion requests received so far.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.preambles.len()
    }

    /// Preamble of every request received, in order.
    pub async fn preambles(&self) -> Vec<Option<String>> {
        self.state.lock().await.preambles.clone()
    }

    async fn push(&self, response: Result<OneOrMany<AssistantContent>, String>) {
        self.state.lock().await.responses.push_back(response);
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        let response = {
            let mut state = self.state.lock().await;
            state.preambles.push(completion_request.preamble);
            state.responses.pop_front()
        };
        match response {
            Some(Ok(choice)) => Ok(CompletionResponse {
                choice,
                raw_response: String::new(),
            }),
            Some(Err(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: String::new(),
            }),
        }
    }
}
