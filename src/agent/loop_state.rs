//! Agent loop state management
//!
//! Tracks the phase of the reasoning loop and the message sequence it is
//! building. Transitions are only made through the `record_*` methods, which
//! keep every tool result directly behind the assistant message that asked
//! for it.

use crate::core::{Message, MindError, Result, Role, ToolCall};

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// The model must be asked for the next assistant message
    AwaitingModel,
    /// The last assistant message requested tools that have not run yet
    AwaitingTools,
    /// The last assistant message is the final answer
    Done,
}

impl std::fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopPhase::AwaitingModel => write!(f, "awaiting model"),
            LoopPhase::AwaitingTools => write!(f, "awaiting tools"),
            LoopPhase::Done => write!(f, "done"),
        }
    }
}

/// State of the agent reasoning loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Model invocations made so far
    pub turn: usize,
    /// Maximum allowed model invocations
    pub max_turns: usize,
    /// Current phase
    pub phase: LoopPhase,
    /// Conversation so far, including everything this run appended
    pub messages: Vec<Message>,
    /// Length of `messages` when the run started
    input_len: usize,
}

impl AgentLoopState {
    /// Start a run over `messages`
    pub fn new(messages: Vec<Message>, max_turns: usize) -> Self {
        Self {
            turn: 0,
            max_turns,
            phase: LoopPhase::AwaitingModel,
            input_len: messages.len(),
            messages,
        }
    }

    /// Whether another model invocation fits in the turn budget
    pub fn has_turns_left(&self) -> bool {
        self.turn < self.max_turns
    }

    /// Record the assistant message returned by the model
    pub fn record_model_reply(&mut self, reply: Message) -> Result<()> {
        self.expect_phase(LoopPhase::AwaitingModel)?;
        if reply.role != Role::Assistant {
            return Err(MindError::model(format!(
                "expected an assistant message, got {}",
                reply.role
            )));
        }

        self.turn += 1;
        self.phase = if reply.has_tool_calls() {
            LoopPhase::AwaitingTools
        } else {
            LoopPhase::Done
        };
        self.messages.push(reply);
        Ok(())
    }

    /// Tool calls of the last assistant message, while awaiting tools
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match (self.phase, self.messages.last()) {
            (LoopPhase::AwaitingTools, Some(last)) => last.tool_calls.as_slice(),
            _ => &[],
        }
    }

    /// Record one result per pending call, in the order the calls were made
    pub fn record_tool_results(&mut self, results: Vec<Message>) -> Result<()> {
        self.expect_phase(LoopPhase::AwaitingTools)?;

        let pending = self.pending_tool_calls();
        if results.len() != pending.len() {
            return Err(MindError::Other(format!(
                "{} tool calls pending but {} results recorded",
                pending.len(),
                results.len()
            )));
        }

        for (call, result) in pending.iter().zip(&results) {
            let answers_call = result.tool_call_id.as_deref() == Some(call.id.as_str());
            if result.role != Role::Tool || !answers_call {
                return Err(MindError::Other(format!(
                    "tool result out of order: expected answer to call '{}'",
                    call.id
                )));
            }
        }

        self.messages.extend(results);
        self.phase = LoopPhase::AwaitingModel;
        Ok(())
    }

    /// Messages appended since the run started
    pub fn new_messages(&self) -> &[Message] {
        &self.messages[self.input_len..]
    }

    fn expect_phase(&self, phase: LoopPhase) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(MindError::Other(format!(
                "agent loop is {}, not {}",
                self.phase, phase
            )))
        }
    }
}
