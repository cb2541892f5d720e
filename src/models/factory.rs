use anyhow::Result;

use super::gemini::GeminiGateway;
use super::traits::LlmGateway;
use crate::app::Config;

/// Factory for creating gateway instances from configuration
pub struct GatewayFactory;

impl GatewayFactory {
    /// Create the configured gateway, with an optional model override
    /// (e.g. "gemini-1.5-pro" from the command line)
    pub fn create(config: &Config, model_override: Option<&str>) -> Result<Box<dyn LlmGateway>> {
        let mut settings = config.gemini.clone();
        if let Some(model) = model_override {
            if model.trim().is_empty() {
                anyhow::bail!("Model name cannot be empty");
            }
            settings.model = model.to_string();
        }

        let gateway = GeminiGateway::new(&settings)?;
        Ok(Box::new(gateway))
    }

    /// Check whether the credential the gateway will need is present
    pub fn has_credential(config: &Config) -> bool {
        std::env::var(&config.gemini.api_key_env)
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}
