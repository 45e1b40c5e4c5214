//! Agent module - the reasoning loop and conversation management
//!
//! [`AgentLoop`] turns one user message into a final answer, calling tools
//! along the way. [`Agent`] keeps the conversation between messages.

pub mod conversation;
pub mod loop_state;
pub mod orchestrator;
pub mod session;

pub use conversation::Conversation;
pub use loop_state::{AgentLoopState, LoopPhase};
pub use orchestrator::{AgentLoop, AgentRun, DEFAULT_MAX_TURNS};
pub use session::Agent;
