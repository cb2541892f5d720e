use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    app::Config,
    cli::OutputFormat,
    models::{GatewayFactory, LlmGateway},
    session::{SessionManager, SessionStore, Speaker, Turn, TurnOutcome},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The question that was asked
    pub prompt: String,
    /// The assistant's answer (or the failure diagnostic)
    pub response: String,
    /// Where the answer came from: "faq", "llm" or "failed"
    pub answered_by: String,
    /// Full transcript, greeting included
    pub transcript: Vec<Turn>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Model used
    pub model: String,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for answering a single question
pub struct NonInteractiveRunner<G> {
    manager: SessionManager<G>,
}

impl NonInteractiveRunner<Box<dyn LlmGateway>> {
    /// Build a runner with the configured FAQ registry and gateway
    pub fn from_config(config: &Config, model_override: Option<&str>) -> Result<Self> {
        let gateway = GatewayFactory::create(config, model_override)?;
        let store = SessionStore::new(config.assistant.greeting.clone());
        Ok(Self::new(SessionManager::new(
            store,
            config.faq_registry()?,
            gateway,
        )))
    }
}

impl<G: LlmGateway> NonInteractiveRunner<G> {
    pub fn new(manager: SessionManager<G>) -> Self {
        Self { manager }
    }

    /// Run one free-text turn and collect the result
    pub async fn execute(&mut self, prompt: String) -> Result<NonInteractiveResult> {
        let start_time = std::time::Instant::now();
        let mut errors = Vec::new();

        self.manager.initialize();
        let outcome = self.manager.handle_free_text(&prompt).await?;

        let answered_by = match &outcome {
            TurnOutcome::FaqAnswered => "faq",
            TurnOutcome::LlmAnswered => "llm",
            TurnOutcome::LlmFailed(err) => {
                errors.push(err.to_string());
                "failed"
            }
        };

        let transcript = self.manager.snapshot().to_vec();
        let response = transcript
            .last()
            .filter(|turn| turn.role() == Speaker::Assistant)
            .map(|turn| turn.content().to_string())
            .unwrap_or_default();

        Ok(NonInteractiveResult {
            prompt,
            response,
            answered_by: answered_by.to_string(),
            transcript,
            errors,
            metadata: ExecutionMetadata {
                model: self.manager.gateway().name().to_string(),
                duration_ms: start_time.elapsed().as_millis(),
            },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&result.response);

                if !result.errors.is_empty() {
                    output.push_str("\n\n--- Errors ---\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                }

                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                output.push_str("## Conversation\n\n");
                for turn in &result.transcript {
                    output.push_str(&format!(
                        "**{}:** {}\n\n",
                        turn.role().display_name(),
                        turn.content()
                    ));
                }

                if !result.errors.is_empty() {
                    output.push_str("## Errors\n\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                    output.push('\n');
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Model: {} | Answered by: {} | Duration: {}ms*\n",
                    result.metadata.model, result.answered_by, result.metadata.duration_ms
                ));

                output
            }
        }
    }
}
