//! redswarm — interactive multi-agent orchestrator for sandboxed red-team
//! operations
//!
//! Usage:
//!   redswarm models                → list models and key availability
//!   redswarm chat                  → interactive session
//!   redswarm logs                  → list stored session logs
//!   redswarm replay <session_id>   → replay a stored session
//!   redswarm config                → show configuration
//!   redswarm serve-terminal        → run the tmux tool server

mod app;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "redswarm",
    about = "Multi-agent orchestrator for sandboxed red-team operations",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models and whether their API keys are configured
    Models,
    /// Start an interactive session
    Chat {
        /// Provider to use (anthropic, openai, deepseek, groq, ollama)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model name; defaults to the provider's first catalog entry
        #[arg(short, long)]
        model: Option<String>,
        /// Tool-server RPC URL; defaults to the in-process docker/tmux pool
        #[arg(long)]
        terminal_url: Option<String>,
    },
    /// List stored session logs
    Logs {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Replay a stored session without calling the LLM or tools
    Replay { session_id: String },
    /// Show the current configuration
    Config,
    /// Run the terminal tool server
    ServeTerminal {
        #[arg(short, long, default_value_t = 3003)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Models => app::run_models(),
        Commands::Chat {
            provider,
            model,
            terminal_url,
        } => app::run_chat(provider, model, terminal_url).await,
        Commands::Logs { limit } => app::run_logs(limit),
        Commands::Replay { session_id } => app::run_replay(&session_id),
        Commands::Config => app::run_config(),
        Commands::ServeTerminal { port } => app::run_serve_terminal(port).await,
    }
}
