//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Agent;
use crate::core::{Message, Role};

/// Longest tool output shown by `history`
const HISTORY_PREVIEW_CHARS: usize = 200;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, agent: &mut Agent) -> CommandResult {
    let input = input.trim();
    let cmd = input.to_lowercase();

    // Commands take no arguments; anything longer is a chat message
    match cmd.trim_start_matches('/') {
        "exit" | "quit" | "q" => CommandResult::Exit,

        "clear" | "reset" => {
            agent.clear_history();
            CommandResult::Clear
        }

        "help" | "?" => CommandResult::Handled(help_text()),

        "tools" => {
            let names = agent.tool_names();
            if names.is_empty() {
                return CommandResult::Handled("No tools enabled.".to_string());
            }
            let output = format!(
                "Available tools:\n{}",
                names
                    .iter()
                    .map(|n| format!("  - {}", n))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            CommandResult::Handled(output)
        }

        "history" => CommandResult::Handled(render_history(agent.conversation().messages())),

        "status" => {
            let config = agent.config();
            let status = format!(
                "MultiToolMind Status:\n\
                 ─────────────────────────────\n\
                 Provider:     {}\n\
                 Model:        {}\n\
                 Max turns:    {}\n\
                 Parallel:     {}\n\
                 Tools:        {}\n\
                 History:      {} messages",
                agent.provider_name(),
                config.model.name,
                config.agent.max_turns,
                if config.agent.parallel_tool_calls {
                    "on"
                } else {
                    "off"
                },
                agent.tool_names().join(", "),
                agent.conversation().len(),
            );
            CommandResult::Handled(status)
        }

        _ if input.starts_with('/') => CommandResult::Handled(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            cmd.split_whitespace().next().unwrap_or("/")
        )),

        _ => CommandResult::Continue(input.to_string()),
    }
}

/// Render the conversation one message per block
pub fn render_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "No messages yet.".to_string();
    }

    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_message(msg: &Message) -> String {
    match msg.role {
        Role::User => format!("You: {}", msg.content),
        Role::Assistant if msg.has_tool_calls() => {
            let calls = msg
                .tool_calls
                .iter()
                .map(|c| format!("  -> {}({})", c.name, c.arguments))
                .collect::<Vec<_>>()
                .join("\n");
            if msg.content.trim().is_empty() {
                format!("Assistant (tools):\n{}", calls)
            } else {
                format!("Assistant: {}\n{}", msg.content, calls)
            }
        }
        Role::Assistant => format!("Assistant: {}", msg.content),
        Role::Tool => {
            let name = msg.name.as_deref().unwrap_or("tool");
            let preview = crate::tools::truncate_chars(&msg.content, HISTORY_PREVIEW_CHARS);
            let ellipsis = if preview.len() < msg.content.len() {
                "..."
            } else {
                ""
            };
            format!("  [{}] {}{}", name, preview, ellipsis)
        }
        Role::System => format!("System: {}", msg.content),
    }
}

/// Generate help text
fn help_text() -> String {
    r#"MultiToolMind Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit MultiToolMind
  clear, reset     Clear conversation history
  tools            List the tools the model can call
  history          Show the conversation, including tool results
  status           Show current configuration

Commands may also be written with a leading '/'.

Keyboard Shortcuts:
  Ctrl+D           Exit MultiToolMind

Tips:
  - Ask about papers to use arxiv, people and places for wikipedia
  - Recent events and news go through web search
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, ToolCall};
    use crate::llm::{LLMResponse, ScriptedProvider};
    use crate::tools::ToolRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn agent() -> Agent {
        let provider = Arc::new(ScriptedProvider::always(LLMResponse::text("ok")));
        Agent::from_parts(
            Config::default(),
            provider,
            ToolRegistry::builder().build().unwrap(),
        )
    }

    #[test]
    fn test_commands() {
        let mut agent = agent();
        assert_eq!(handle_command("exit", &mut agent), CommandResult::Exit);
        assert_eq!(handle_command("/quit", &mut agent), CommandResult::Exit);
        assert_eq!(handle_command("clear", &mut agent), CommandResult::Clear);
        assert!(matches!(
            handle_command("help", &mut agent),
            CommandResult::Handled(_)
        ));
        assert_eq!(
            handle_command("  what is RAG?  ", &mut agent),
            CommandResult::Continue("what is RAG?".into())
        );
    }

    #[tokio::test]
    async fn test_questions_starting_with_command_words_are_chat() {
        let mut agent = agent();
        agent.process("hello").await.unwrap();

        for question in [
            "clear explanation of attention please",
            "exit polls in the 2024 election",
            "History of the Roman empire",
            "status of the James Webb telescope",
            "tools used by early humans",
            "help me find papers on diffusion",
        ] {
            assert_eq!(
                handle_command(question, &mut agent),
                CommandResult::Continue(question.to_string())
            );
        }
        assert_eq!(agent.conversation().len(), 2);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        let mut agent = agent();
        assert_eq!(handle_command("  EXIT ", &mut agent), CommandResult::Exit);
        assert!(matches!(
            handle_command("History", &mut agent),
            CommandResult::Handled(_)
        ));
    }

    #[test]
    fn test_unknown_slash_command() {
        let mut agent = agent();
        match handle_command("/frobnicate now", &mut agent) {
            CommandResult::Handled(text) => {
                assert!(text.contains("Unknown command: /frobnicate."))
            }
            other => panic!("unexpected {:?}", other),
        }
        match handle_command("/clear everything", &mut agent) {
            CommandResult::Handled(text) => assert!(text.contains("Unknown command: /clear.")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_render_history() {
        let call = ToolCall::new("c1", "wikipedia", json!({"query": "Rust"}));
        let long = "x".repeat(HISTORY_PREVIEW_CHARS + 10);
        let messages = vec![
            Message::user("Tell me about Rust"),
            Message::assistant_with_tools("", vec![call.clone()]),
            Message::tool_result(&call, long),
            Message::assistant("Rust is a language."),
        ];

        let text = render_history(&messages);
        assert!(text.contains("You: Tell me about Rust"));
        assert!(text.contains("-> wikipedia({\"query\":\"Rust\"})"));
        assert!(text.contains("[wikipedia] "));
        assert!(text.contains("..."));
        assert!(text.ends_with("Assistant: Rust is a language."));
        assert_eq!(render_history(&[]), "No messages yet.");
    }
}
