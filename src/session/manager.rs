use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::store::SessionStore;
use super::turn::Turn;
use crate::constants::GATEWAY_FAILURE_PREFIX;
use crate::faq::FaqRegistry;
use crate::models::LlmGateway;
use crate::utils::{ChatError, GatewayError};

/// Input delivered by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// A FAQ shortcut was chosen from the enumerated list
    FaqSelected(String),
    /// The user typed and submitted a message
    FreeTextSubmitted(String),
}

/// Transcript-changed notifications for re-rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TurnAppended(Turn),
    /// The user turn is visible and the gateway call is in flight
    Pending,
    /// The turn is complete; the last transcript entry is an assistant turn
    Settled,
}

/// How a handled turn was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    FaqAnswered,
    LlmAnswered,
    /// The gateway failed; a diagnostic assistant turn was appended instead
    LlmFailed(GatewayError),
}

/// Text of the assistant turn that stands in for a failed reply
pub fn failure_message(err: &GatewayError) -> String {
    format!("{}: {}", GATEWAY_FAILURE_PREFIX, err)
}

/// Orchestrates turn-taking for one conversation.
///
/// Every handled user turn is followed by exactly one assistant turn before
/// the handler returns, whether the answer came from the FAQ registry, the
/// gateway, or a gateway failure.
pub struct SessionManager<G> {
    store: SessionStore,
    faq: FaqRegistry,
    gateway: G,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<G: LlmGateway> SessionManager<G> {
    pub fn new(store: SessionStore, faq: FaqRegistry, gateway: G) -> Self {
        Self {
            store,
            faq,
            gateway,
            events: None,
        }
    }

    /// Start publishing [`SessionEvent`]s; replaces any earlier subscriber
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Seed the greeting if the transcript is empty
    pub fn initialize(&mut self) -> bool {
        let seeded = self.store.initialize();
        if seeded {
            if let Some(greeting) = self.store.snapshot().first().cloned() {
                self.emit(SessionEvent::TurnAppended(greeting));
            }
        }
        seeded
    }

    /// Answer a question chosen from the FAQ list
    pub fn handle_faq_selection(&mut self, question: &str) -> Result<TurnOutcome, ChatError> {
        let answer = self
            .faq
            .lookup(question)
            .ok_or_else(|| ChatError::UnknownFaq(question.to_string()))?
            .to_string();

        self.initialize();
        debug!(question, "answering from FAQ registry");
        self.append(Turn::user(question));
        self.append(Turn::assistant(answer));
        self.emit(SessionEvent::Settled);

        Ok(TurnOutcome::FaqAnswered)
    }

    /// Answer a typed message, via the FAQ fast path when it is an exact
    /// registry key, otherwise via the gateway
    pub async fn handle_free_text(&mut self, utterance: &str) -> Result<TurnOutcome, ChatError> {
        if utterance.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        if self.faq.contains(utterance) {
            return self.handle_faq_selection(utterance);
        }

        self.initialize();

        // Context is taken before the user turn lands so the utterance is not duplicated
        let history = self.store.snapshot().to_vec();
        self.append(Turn::user(utterance));
        self.emit(SessionEvent::Pending);

        debug!(history = history.len(), "forwarding to gateway");
        let outcome = match self.gateway.generate(&history, utterance).await {
            Ok(reply) => {
                self.append(Turn::assistant(reply));
                TurnOutcome::LlmAnswered
            }
            Err(err) => {
                warn!(error = %err, "gateway call failed");
                self.append(Turn::assistant(failure_message(&err)));
                TurnOutcome::LlmFailed(err)
            }
        };
        self.emit(SessionEvent::Settled);

        Ok(outcome)
    }

    /// Dispatch a presentation-layer event
    pub async fn handle_event(&mut self, event: UserEvent) -> Result<TurnOutcome, ChatError> {
        match event {
            UserEvent::FaqSelected(question) => self.handle_faq_selection(&question),
            UserEvent::FreeTextSubmitted(utterance) => self.handle_free_text(&utterance).await,
        }
    }

    pub fn snapshot(&self) -> &[Turn] {
        self.store.snapshot()
    }

    pub fn faq(&self) -> &FaqRegistry {
        &self.faq
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn append(&mut self, turn: Turn) {
        self.store.append(turn.clone());
        self.emit(SessionEvent::TurnAppended(turn));
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is rendering
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faq::FaqEntry;
    use crate::models::MockLlmGateway;
    use crate::session::Speaker;
    use pretty_assertions::assert_eq;

    fn registry() -> FaqRegistry {
        FaqRegistry::new(vec![FaqEntry::new("A?", "B.")]).unwrap()
    }

    fn manager(gateway: MockLlmGateway) -> SessionManager<MockLlmGateway> {
        let mut manager = SessionManager::new(SessionStore::new("greeting"), registry(), gateway);
        manager.initialize();
        manager
    }

    fn no_calls() -> MockLlmGateway {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().times(0);
        gateway
    }

    #[test]
    fn test_faq_selection_appends_question_and_answer() {
        let mut manager = manager(no_calls());

        let outcome = manager.handle_faq_selection("A?").unwrap();

        assert_eq!(outcome, TurnOutcome::FaqAnswered);
        assert_eq!(
            manager.snapshot(),
            &[Turn::assistant("greeting"), Turn::user("A?"), Turn::assistant("B.")]
        );
    }

    #[test]
    fn test_unknown_faq_selection_appends_nothing() {
        let mut manager = manager(no_calls());

        let result = manager.handle_faq_selection("Z?");

        assert!(matches!(result, Err(ChatError::UnknownFaq(q)) if q == "Z?"));
        assert_eq!(manager.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_free_text_matching_faq_skips_gateway() {
        let mut manager = manager(no_calls());

        let outcome = manager.handle_free_text("A?").await.unwrap();

        assert_eq!(outcome, TurnOutcome::FaqAnswered);
        assert_eq!(manager.snapshot()[2], Turn::assistant("B."));
    }

    #[tokio::test]
    async fn test_free_text_near_match_goes_to_gateway() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .withf(|_, utterance| utterance.to_string() == "a?")
            .times(1)
            .returning(|_, _| Ok("remote".to_string()));
        let mut manager = manager(gateway);

        let outcome = manager.handle_free_text("a?").await.unwrap();

        assert_eq!(outcome, TurnOutcome::LlmAnswered);
        assert_eq!(manager.snapshot().last(), Some(&Turn::assistant("remote")));
    }

    #[tokio::test]
    async fn test_empty_free_text_rejected() {
        let mut manager = manager(no_calls());

        let result = manager.handle_free_text("").await;

        assert!(matches!(result, Err(ChatError::EmptyMessage)));
        assert_eq!(manager.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_history_excludes_in_flight_utterance() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .withf(|history, utterance| {
                history.to_vec() == vec![Turn::assistant("greeting")] && utterance.to_string() == "C?"
            })
            .times(1)
            .returning(|_, _| Ok("D.".to_string()));
        let mut manager = manager(gateway);

        manager.handle_free_text("C?").await.unwrap();

        assert_eq!(
            manager.snapshot(),
            &[Turn::assistant("greeting"), Turn::user("C?"), Turn::assistant("D.")]
        );
    }

    #[tokio::test]
    async fn test_gateway_failure_becomes_diagnostic_turn() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GatewayError::Transport("connection reset".to_string())));
        let mut manager = manager(gateway);

        let outcome = manager.handle_free_text("C?").await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::LlmFailed(GatewayError::Transport("connection reset".to_string()))
        );
        let last = manager.snapshot().last().unwrap();
        assert_eq!(last.role(), Speaker::Assistant);
        assert!(last.content().starts_with(GATEWAY_FAILURE_PREFIX));
        assert!(last.content().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_handlers_initialize_on_first_use() {
        let mut session =
            SessionManager::new(SessionStore::new("greeting"), registry(), no_calls());

        session.handle_faq_selection("A?").unwrap();

        assert_eq!(session.snapshot()[0], Turn::assistant("greeting"));
        assert_eq!(session.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_events_follow_turn_order() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .returning(|_, _| Ok("D.".to_string()));
        let mut session = SessionManager::new(SessionStore::new("greeting"), registry(), gateway);
        let mut rx = session.subscribe();

        session.initialize();
        session.handle_free_text("C?").await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                SessionEvent::TurnAppended(Turn::assistant("greeting")),
                SessionEvent::TurnAppended(Turn::user("C?")),
                SessionEvent::Pending,
                SessionEvent::TurnAppended(Turn::assistant("D.")),
                SessionEvent::Settled,
            ]
        );
    }

    #[tokio::test]
    async fn test_handle_event_dispatch() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .times(1)
            .returning(|_, _| Ok("D.".to_string()));
        let mut manager = manager(gateway);

        let faq = manager
            .handle_event(UserEvent::FaqSelected("A?".to_string()))
            .await
            .unwrap();
        let llm = manager
            .handle_event(UserEvent::FreeTextSubmitted("C?".to_string()))
            .await
            .unwrap();

        assert_eq!(faq, TurnOutcome::FaqAnswered);
        assert_eq!(llm, TurnOutcome::LlmAnswered);
        assert_eq!(manager.snapshot().len(), 5);
    }
}
