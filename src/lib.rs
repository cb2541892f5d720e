pub mod app;
pub mod cli;
pub mod constants;
pub mod faq;
pub mod models;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use faq::{FaqEntry, FaqRegistry};
pub use models::{GatewayFactory, GeminiGateway, LlmGateway};
pub use session::{SessionEvent, SessionManager, SessionStore, Speaker, Turn, TurnOutcome, UserEvent};
pub use tui::run_ui;
pub use utils::{ChatError, GatewayError};
