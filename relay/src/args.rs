use std::path::PathBuf;

use clap::Parser;

/// Relay: chat with any OpenRouter model from the terminal
#[derive(Debug, Parser)]
#[command(name = "relay", about = "Send a prompt to an OpenRouter model")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model to use, e.g. `openai/gpt-4`
    #[arg(short, long, env = "RELAY_MODEL")]
    pub model: Option<String>,

    /// System instruction prepended to the conversation
    #[arg(short, long)]
    pub system: Option<String>,

    /// Wait for the whole reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// OpenRouter API key, overrides the configuration file
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Prompt to send
    pub prompt: String,
}
