// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod gemini;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use factory::GatewayFactory;
pub use gemini::GeminiGateway;
pub use traits::LlmGateway;

#[cfg(test)]
pub use traits::MockLlmGateway;
