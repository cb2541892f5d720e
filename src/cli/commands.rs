use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::GatewayFactory,
};

use super::Commands;

/// Handle CLI subcommands. Returns `true` when the command was handled and
/// the program should exit instead of opening the chat.
pub fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing configuration...");
            let path = init_config()?;
            println!("Configuration ready at {}", path.display());
            Ok(true)
        }
        Commands::Faq => {
            list_faq(config)?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config)?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// List the FAQ shortcuts in definition order
pub fn list_faq(config: &Config) -> Result<()> {
    let registry = config.faq_registry()?;
    println!("Perguntas Frequentes:");
    for (i, entry) in registry.entries().iter().enumerate() {
        println!("  {}. {}", i + 1, entry.question.green());
        println!("     {}", entry.answer);
    }
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("emi v{}", env!("CARGO_PKG_VERSION"));
    println!("   Governance assistant with FAQ shortcuts and a Gemini-backed chat");
}

/// Show credential and configuration status
fn show_status(config: &Config) -> Result<()> {
    println!("Status:");
    println!();

    if GatewayFactory::has_credential(config) {
        println!("  [OK] Credential: {} is set", config.gemini.api_key_env);
    } else {
        println!(
            "  [ERROR] Credential: {} is not set (free-text questions will fail)",
            config.gemini.api_key_env
        );
    }

    println!("  [OK] Model: {} via {}", config.gemini.model, config.gemini.base_url);

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    match config.faq_registry() {
        Ok(registry) => println!("  [OK] FAQ registry: {} entries", registry.len()),
        Err(e) => println!("  [ERROR] FAQ registry: {}", e),
    }

    println!();
    Ok(())
}
