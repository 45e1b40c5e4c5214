//! MultiToolMind - Tool-Augmented Research Chat Agent
//!
//! A conversational agent that answers questions by letting a hosted model
//! call search tools (arXiv, Wikipedia and Tavily web search) in a
//! reason-act-observe loop.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with a Groq (OpenAI-compatible) client
//! - **Tools**: Tool trait, registry and the built-in search tools
//! - **Agent**: The reasoning loop and conversation management
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use multitoolmind::{Agent, Config};
//!
//! #[tokio::main]
//! async fn main() -> multitoolmind::Result<()> {
//!     let mut agent = Agent::with_config(Config::load()?)?;
//!
//!     let response = agent.process("What is attention in transformers?").await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentLoop};
pub use cli::Repl;
pub use core::{Config, MindError, Result};
