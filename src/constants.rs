/// Constants module to avoid magic numbers in the codebase

// Assistant identity
pub const DEFAULT_ASSISTANT_NAME: &str = "CHAT EMI";
pub const DEFAULT_GREETING: &str = "Olá! Estou aqui para ajudar com suas dúvidas sobre governança na empresa EMS. Você pode digitar sua pergunta ou escolher uma das opções abaixo:";
pub const GATEWAY_FAILURE_PREFIX: &str = "Desculpe, ocorreu um erro ao contatar a IA";
pub const DEFAULT_PENDING_TEXT: &str = "Digitando... ▌";

// Network Configuration
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;

// Configuration locations
pub const CONFIG_ENV_PREFIX: &str = "EMI_";
pub const LOCAL_CONFIG_PATH: &str = ".emi/config.toml";
