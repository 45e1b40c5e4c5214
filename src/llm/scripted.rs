//! Scripted provider for tests and offline runs
//!
//! Replays a fixed sequence of responses and records every request it saw.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::core::{Message, MindError, Result, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this response
    Respond(LLMResponse),
    /// Fail the call with a model error carrying this message
    Fail(String),
}

/// A request as the provider received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// A provider that returns pre-configured responses
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    /// Replayed forever once `steps` runs out
    fallback: Option<LLMResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    /// Create a provider with a sequence of steps
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that answers with the given responses in order
    pub fn responding(responses: impl IntoIterator<Item = LLMResponse>) -> Self {
        Self::new(responses.into_iter().map(ScriptStep::Respond))
    }

    /// Create a provider that returns `response` on every call
    pub fn always(response: LLMResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::<ScriptStep>::new())
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                model: model.to_string(),
                messages: messages.to_vec(),
                tools: tools.to_vec(),
            });

        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            Some(ScriptStep::Respond(response)) => Ok(response),
            Some(ScriptStep::Fail(message)) => Err(MindError::model(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| MindError::model("scripted provider has no responses left")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
