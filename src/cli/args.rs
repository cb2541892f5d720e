use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "emi")]
#[command(version)]
#[command(about = "Governance assistant with FAQ shortcuts and a Gemini-backed chat", long_about = None)]
pub struct Cli {
    /// Gemini model to use (e.g., gemini-1.5-flash-latest, gemini-1.5-pro)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Non-interactive question to answer
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// List the FAQ shortcuts
    Faq,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check credential and configuration status
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
