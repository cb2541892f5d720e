use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_API_KEY_ENV, DEFAULT_ASSISTANT_NAME, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_GREETING, DEFAULT_PENDING_TEXT, HTTP_REQUEST_TIMEOUT_SECS,
    LOCAL_CONFIG_PATH,
};
use crate::faq::FaqRegistry;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Assistant identity and FAQ source
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Gemini gateway configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Assistant identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Name shown in the header
    pub name: String,
    /// First assistant message of every session
    pub greeting: String,
    /// TOML file with `[[faq]]` entries replacing the built-in registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq_file: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ASSISTANT_NAME.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            faq_file: None,
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiConfig {
    /// Model name (e.g. "gemini-1.5-flash-latest")
    pub model: String,
    /// API root, overridable for proxies and tests
    pub base_url: String,
    /// Environment variable containing API key
    pub api_key_env: String,
    /// Request timeout; expiry is reported as a transport failure
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            temperature: None,
            max_output_tokens: None,
            system_prompt: None,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    /// Show the FAQ shortcut panel
    pub show_faq_panel: bool,
    /// Placeholder shown while a reply is pending
    pub pending_text: String,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            show_faq_panel: true,
            pending_text: DEFAULT_PENDING_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Build the FAQ registry this configuration points at
    pub fn faq_registry(&self) -> Result<FaqRegistry> {
        match &self.assistant.faq_file {
            Some(path) => FaqRegistry::from_file(path)
                .with_context(|| format!("Failed to load FAQ file {}", path.display())),
            None => Ok(FaqRegistry::builtin()),
        }
    }
}

/// Load configuration from multiple sources
///
/// Defaults, then the global file, then `.emi/config.toml`, then `EMI_*`
/// environment variables (`EMI_GEMINI__MODEL` sets `gemini.model`).
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(LOCAL_CONFIG_PATH);

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    extract(figment)
}

/// Load configuration from an explicit file, still honouring `EMI_*` overrides
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path));
    extract(figment)
}

fn extract(figment: Figment) -> Result<Config> {
    figment
        .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "emi-chat") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("emi-chat"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist.
///
/// Returns the path of the config file.
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    Ok(config_file)
}
