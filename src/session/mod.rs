/// Session management module - Gateway

mod manager;
mod store;
mod turn;

pub use manager::{failure_message, SessionEvent, SessionManager, TurnOutcome, UserEvent};
pub use store::SessionStore;
pub use turn::{Speaker, Turn};
