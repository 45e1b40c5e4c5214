//! Interactive REPL for MultiToolMind
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::Agent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::Result;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
}

impl Repl {
    /// Wrap an existing agent
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    /// Run the REPL until `exit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Clear => {
                    println!("Conversation cleared.\n");
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::Continue(input) => match self.agent.process(&input).await {
                    Ok(response) => println!("\nAssistant:\n{}\n", response),
                    Err(e) => eprintln!("\nError: {}\n", e),
                },
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();

        println!();
        println!("MultiToolMind - research assistant with arxiv, wikipedia and web search");
        println!("Model:      {}", config.model.name);
        println!("Endpoint:   {}", config.model.base_url);
        println!("Tools:      {}", self.agent.tool_names().join(", "));
        println!();
        println!("Commands: help, clear, tools, history, status, exit");
        println!("─────────────────────────────────────────────────────────────");
    }
}
