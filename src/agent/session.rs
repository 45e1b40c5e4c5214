//! Agent session
//!
//! Owns the conversation and feeds each user message through the agent loop.

use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::conversation::Conversation;
use crate::agent::orchestrator::AgentLoop;
use crate::core::{Config, Credentials, Message, Result};
use crate::llm::{GroqClient, LLMProvider};
use crate::tools::ToolRegistry;

/// A conversational agent with tools
pub struct Agent {
    /// Configuration
    config: Config,
    agent_loop: AgentLoop,
    /// Conversation history, shared across messages
    conversation: Conversation,
}

impl Agent {
    /// Create an agent from configuration, reading API keys from the environment
    pub fn with_config(config: Config) -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let provider = GroqClient::from_config(&config.model, credentials.groq_api_key.clone())?;
        let tools = ToolRegistry::from_config(&config.tools, &credentials)?;

        info!(
            model = %config.model.name,
            tools = ?tools.names(),
            "agent ready"
        );

        Ok(Self::from_parts(config, Arc::new(provider), tools))
    }

    /// Create an agent from an already built provider and registry
    pub fn from_parts(config: Config, provider: Arc<dyn LLMProvider>, tools: ToolRegistry) -> Self {
        let agent_loop = AgentLoop::from_config(&config, provider, Arc::new(tools));
        Self {
            config,
            agent_loop,
            conversation: Conversation::new(),
        }
    }

    /// Process one user message and return the final answer
    ///
    /// The user message and everything the loop produced are appended to the
    /// conversation only when the run succeeds. A failed run leaves the
    /// history as it was.
    pub async fn process(&mut self, input: &str) -> Result<String> {
        let user = Message::user(input);
        let mut snapshot = self.conversation.snapshot();
        snapshot.push(user.clone());

        let run = self.agent_loop.run(snapshot).await?;

        self.conversation.append(user);
        for message in run.new_messages() {
            self.conversation.append(message.clone());
        }

        debug!(
            turns = run.turns,
            history = self.conversation.len(),
            "message processed"
        );
        Ok(run.answer().to_string())
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Forget the conversation so far
    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the tools offered to the model
    pub fn tool_names(&self) -> Vec<&str> {
        self.agent_loop.tools().names()
    }

    pub fn provider_name(&self) -> &str {
        self.agent_loop.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;
    use crate::llm::{LLMResponse, ScriptStep, ScriptedProvider};
    use serde_json::json;

    #[tokio::test]
    async fn test_history_carries_over() {
        let provider = Arc::new(ScriptedProvider::responding([
            LLMResponse::text("Hi Ana"),
            LLMResponse::text("You said your name is Ana"),
        ]));
        let tools = ToolRegistry::builder().build().unwrap();
        let mut agent = Agent::from_parts(Config::default(), provider.clone(), tools);

        assert_eq!(agent.process("I'm Ana").await.unwrap(), "Hi Ana");
        agent.process("What's my name?").await.unwrap();

        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[0], Message::user("I'm Ana"));
        assert_eq!(agent.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_run_appends_nothing() {
        let provider = Arc::new(ScriptedProvider::new([
            ScriptStep::Respond(LLMResponse::with_tool_calls(
                "",
                vec![ToolCall::new("c1", "nowhere", json!({"query": "x"}))],
            )),
            ScriptStep::Fail("rate limited".into()),
        ]));
        let tools = ToolRegistry::builder().build().unwrap();
        let mut agent = Agent::from_parts(Config::default(), provider, tools);

        assert!(agent.process("hello").await.is_err());
        assert!(agent.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let provider = Arc::new(ScriptedProvider::always(LLMResponse::text("ok")));
        let tools = ToolRegistry::builder().build().unwrap();
        let mut agent = Agent::from_parts(Config::default(), provider, tools);

        agent.process("one").await.unwrap();
        assert_eq!(agent.conversation().len(), 2);
        agent.clear_history();
        assert!(agent.conversation().is_empty());
        assert_eq!(agent.provider_name(), "scripted");
    }
}
