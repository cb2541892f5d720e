use thiserror::Error;

/// Failure of a single remote generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing or unusable credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure, timeout or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered but the reply could not be turned into text
    #[error("Response error: {0}")]
    Response(String),
}

/// Main error type for the chat core
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("question is not a registered FAQ: {0}")]
    UnknownFaq(String),

    #[error("duplicate FAQ question: {0}")]
    DuplicateFaq(String),

    #[error("invalid FAQ source: {0}")]
    FaqSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Config("GEMINI_API_KEY is not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: GEMINI_API_KEY is not set");

        let err = GatewayError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = GatewayError::Response("no candidates".to_string());
        assert_eq!(err.to_string(), "Response error: no candidates");
    }

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::UnknownFaq("Q?".to_string()).to_string(),
            "question is not a registered FAQ: Q?"
        );
        assert_eq!(
            ChatError::DuplicateFaq("Q?".to_string()).to_string(),
            "duplicate FAQ question: Q?"
        );
    }
}
