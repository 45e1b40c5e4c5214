//! MultiToolMind - research assistant with tools
//!
//! Main entry point for the CLI application.

use clap::Parser;
use multitoolmind::{Agent, Config, Repl};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// MultiToolMind - chat agent that searches arxiv, wikipedia and the web
#[derive(Parser, Debug)]
#[command(name = "multitoolmind")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model served by the chat completions endpoint
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum model calls per message
    #[arg(long)]
    max_turns: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Run tool calls from the same reply concurrently
    #[arg(long)]
    parallel_tools: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }

    if let Some(max_turns) = args.max_turns {
        config.agent.max_turns = max_turns;
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.parallel_tools {
        config.agent.parallel_tool_calls = true;
    }

    config.validate()?;
    init_logging(config.agent.debug);
    debug!(?config, "configuration loaded");

    if args.show_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.init_config {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let agent = Agent::with_config(config)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut agent = agent;
        let response = agent.process(&prompt).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    Repl::with_agent(agent).run().await?;

    Ok(())
}

/// Log to stderr so answers on stdout stay clean
fn init_logging(debug: bool) {
    let default = if debug {
        "multitoolmind=debug"
    } else {
        "multitoolmind=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
