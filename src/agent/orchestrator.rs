//! Agent loop
//!
//! Alternates between asking the model for the next assistant message and
//! running the tools it requested, until the model answers without tool calls.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::agent::loop_state::{AgentLoopState, LoopPhase};
use crate::core::{Config, Message, MindError, Result, ToolCall, ToolDefinition};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::ToolRegistry;

/// Default model invocations allowed per run
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Drives one user message to a final answer
pub struct AgentLoop {
    /// LLM client
    provider: Arc<dyn LLMProvider>,
    /// Tool registry
    tools: Arc<ToolRegistry>,
    /// Definitions handed to the model on every call
    tool_defs: Vec<ToolDefinition>,
    /// Model identifier
    model: String,
    max_turns: usize,
    parallel_tool_calls: bool,
    /// Prepended to model input, never part of the returned conversation
    system_prompt: Option<String>,
    options: GenerateOptions,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Input conversation followed by every message the run produced
    pub messages: Vec<Message>,
    /// Model invocations used
    pub turns: usize,
    /// Final phase, always [`LoopPhase::Done`] for a returned run
    pub phase: LoopPhase,
    input_len: usize,
}

impl AgentRun {
    /// Messages produced by this run, in order
    pub fn new_messages(&self) -> &[Message] {
        &self.messages[self.input_len..]
    }

    /// The final assistant message
    pub fn final_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the final assistant message
    pub fn answer(&self) -> &str {
        self.final_message().map(|m| m.content.as_str()).unwrap_or("")
    }
}

impl AgentLoop {
    /// Create a loop with default limits
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        let tool_defs = tools.list();
        Self {
            provider,
            tools,
            tool_defs,
            model: model.into(),
            max_turns: DEFAULT_MAX_TURNS,
            parallel_tool_calls: false,
            system_prompt: None,
            options: GenerateOptions::default(),
        }
    }

    /// Create a loop configured from `config`
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new(provider, tools, config.model.name.clone())
            .with_max_turns(config.agent.max_turns)
            .with_parallel_tool_calls(config.agent.parallel_tool_calls)
            .with_system_prompt(config.agent.system_prompt.clone())
            .with_options(GenerateOptions {
                temperature: config.model.temperature,
                ..Default::default()
            })
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the loop over `conversation` until the model gives a final answer
    ///
    /// Fails with the model's error if a model call fails, and with
    /// [`MindError::MaxTurnsExceeded`] if the model is still requesting tools
    /// when the turn budget is spent. Tool failures never fail the run.
    pub async fn run(&self, conversation: Vec<Message>) -> Result<AgentRun> {
        let mut state = AgentLoopState::new(conversation, self.max_turns);

        loop {
            match state.phase {
                LoopPhase::AwaitingModel => {
                    info!(turn = state.turn + 1, max_turns = state.max_turns, "calling model");
                    let reply = self.call_model(&state.messages).await?;
                    state.record_model_reply(reply)?;
                }
                LoopPhase::AwaitingTools => {
                    if !state.has_turns_left() {
                        warn!(max_turns = state.max_turns, "model still requesting tools");
                        return Err(MindError::MaxTurnsExceeded {
                            max_turns: state.max_turns,
                        });
                    }

                    let calls = state.pending_tool_calls().to_vec();
                    info!(turn = state.turn, count = calls.len(), "executing tools");
                    let results = self.execute_tools(&calls).await;
                    state.record_tool_results(results)?;
                }
                LoopPhase::Done => break,
            }
        }

        info!(
            turns = state.turn,
            produced = state.new_messages().len(),
            "agent loop complete"
        );

        let input_len = state.messages.len() - state.new_messages().len();
        Ok(AgentRun {
            turns: state.turn,
            phase: state.phase,
            messages: state.messages,
            input_len,
        })
    }

    /// Ask the model for the next assistant message
    async fn call_model(&self, messages: &[Message]) -> Result<Message> {
        let response = match &self.system_prompt {
            Some(prompt) => {
                let mut input = Vec::with_capacity(messages.len() + 1);
                input.push(Message::system(prompt.clone()));
                input.extend_from_slice(messages);
                self.chat(&input).await?
            }
            None => self.chat(messages).await?,
        };

        debug!(
            tool_calls = response.tool_calls.len(),
            usage = ?response.usage,
            "model replied"
        );
        Ok(response.into_message())
    }

    async fn chat(&self, messages: &[Message]) -> Result<crate::llm::LLMResponse> {
        self.provider
            .chat_with_tools(
                &self.model,
                messages,
                &self.tool_defs,
                Some(self.options.clone()),
            )
            .await
    }

    /// Resolve every call, keeping results in request order
    async fn execute_tools(&self, calls: &[ToolCall]) -> Vec<Message> {
        if self.parallel_tool_calls {
            join_all(calls.iter().map(|call| self.execute_tool(call))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.execute_tool(call).await);
            }
            results
        }
    }

    /// Run one call; failures become an error tool result
    async fn execute_tool(&self, call: &ToolCall) -> Message {
        match self.tools.invoke(&call.name, &call.arguments).await {
            Ok(output) => {
                debug!(tool = %call.name, id = %call.id, bytes = output.len(), "tool ok");
                Message::tool_result(call, output)
            }
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, error = %e, "tool call failed");
                Message::tool_result(call, format!("Error: {}", e))
            }
        }
    }
}
