use std::{collections::VecDeque, sync::Mutex};

use crate::{BedrockTransport, PromptNodeError, PromptNodeResult};

/// Result for a mocked `invoke_model` call.
/// It can either be a raw response body or an error to return.
pub enum MockInvokeResult {
    Body(Vec<u8>),
    Error(PromptNodeError),
}

impl MockInvokeResult {
    /// Construct a result that yields the provided JSON value as the body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::Body(value.to_string().into_bytes())
    }

    /// Construct a result that yields the provided raw body.
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self::Body(body.into())
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: PromptNodeError) -> Self {
        Self::Error(error)
    }

    /// Construct a provider error with the given code and message.
    pub fn provider_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(PromptNodeError::Provider {
            code: code.into(),
            message: message.into(),
        })
    }
}

impl From<serde_json::Value> for MockInvokeResult {
    fn from(value: serde_json::Value) -> Self {
        Self::json(&value)
    }
}

impl From<PromptNodeError> for MockInvokeResult {
    fn from(error: PromptNodeError) -> Self {
        Self::error(error)
    }
}

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct TrackedInvocation {
    pub model_id: String,
    pub body: Vec<u8>,
}

impl TrackedInvocation {
    /// The request body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("tracked body is not JSON")
    }
}

#[derive(Default)]
struct MockTransportState {
    mocked_results: VecDeque<MockInvokeResult>,
    tracked_invocations: Vec<TrackedInvocation>,
}

/// A mock transport for testing that tracks requests and yields predefined
/// results in order.
pub struct MockTransport {
    provider: &'static str,
    state: Mutex<MockTransportState>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            provider: "mock",
            state: Mutex::new(MockTransportState::default()),
        }
    }
}

impl MockTransport {
    /// Construct a new mock transport instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the provider identifier returned by the mock.
    pub fn set_provider(&mut self, provider: &'static str) {
        self.provider = provider;
    }

    /// Enqueue a mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockInvokeResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.push_back(result.into());
        drop(state);
        self
    }

    /// Retrieve the requests observed so far.
    pub fn tracked_invocations(&self) -> Vec<TrackedInvocation> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_invocations.clone()
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.clear();
        state.tracked_invocations.clear();
    }
}

#[async_trait::async_trait]
impl BedrockTransport for MockTransport {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> PromptNodeResult<Vec<u8>> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_invocations.push(TrackedInvocation {
            model_id: model_id.to_string(),
            body,
        });

        let result = state.mocked_results.pop_front().ok_or_else(|| {
            PromptNodeError::Invariant(self.provider, "no mocked results available".into())
        })?;

        match result {
            MockInvokeResult::Body(body) => Ok(body),
            MockInvokeResult::Error(error) => Err(error),
        }
    }
}
