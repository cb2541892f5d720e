use anyhow::Result;
use clap::Parser;

use emi_chat::{
    cli::Cli,
    runtime::{resolve_config, NonInteractiveRunner, Orchestrator},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging stays off unless --verbose or RUST_LOG asks for it
    init_logger(cli.verbose);

    // Check if running in non-interactive mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, prompt).await
    } else {
        // Create and run the orchestrator for interactive mode
        let orchestrator = Orchestrator::new(cli)?;
        orchestrator.run().await
    }
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, prompt: String) -> Result<()> {
    let config = resolve_config(&cli)?;

    let mut runner = NonInteractiveRunner::from_config(&config, cli.model.as_deref())?;

    let result = runner.execute(prompt).await?;

    let formatted = runner.format_result(&result, cli.output_format);
    println!("{}", formatted);

    // Exit with appropriate code
    if !result.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
