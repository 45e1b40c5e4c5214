//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction, the Groq client used in production and
//! a scripted provider for tests.

pub mod groq;
pub mod scripted;
pub mod traits;

pub use groq::GroqClient;
pub use scripted::{RecordedRequest, ScriptStep, ScriptedProvider};
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
