use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;

use crate::{
    app::{load_config, load_config_from, Config},
    cli::{handle_command, Cli},
    models::{GatewayFactory, LlmGateway},
    session::{SessionManager, SessionStore},
    tui::{run_ui, App},
    utils::log_progress,
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config)? {
                return Ok(()); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        log_progress(1, 3, "Loading FAQ registry");
        let faq = self.config.faq_registry()?;

        log_progress(2, 3, "Preparing Gemini gateway");
        let gateway = GatewayFactory::create(&self.config, self.cli.model.as_deref())
            .context("Failed to initialize gateway")?;

        if !GatewayFactory::has_credential(&self.config) {
            // Not fatal: FAQ shortcuts still work, free-text turns report the problem
            eprintln!(
                "⚠️  {} is not set. Free-text questions will fail until it is.",
                self.config.gemini.api_key_env
            );
        }

        println!(
            "Starting {} with model: {}",
            self.config.assistant.name,
            gateway.name().green()
        );

        log_progress(3, 3, "Opening chat");
        let app = App::new(&self.config, &faq, gateway.name());
        let store = SessionStore::new(self.config.assistant.greeting.clone());
        let manager = SessionManager::new(store, faq, gateway);

        run_ui(app, manager).await
    }
}

/// Load configuration: explicit `--config` file, or the layered defaults.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => load_config_from(path),
        None => match load_config() {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!(error = %e, "failed to load config, using defaults");
                eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                Ok(Config::default())
            }
        },
    }
}
