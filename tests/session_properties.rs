//! Transcript behaviour of the session manager, observed through the public API.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

use emi_chat::{
    FaqEntry, FaqRegistry, GatewayError, LlmGateway, SessionEvent, SessionManager, SessionStore,
    Speaker, Turn, TurnOutcome,
};

const GREETING: &str = "greeting";

/// Gateway stub that counts calls and records what it was given
#[derive(Clone, Default)]
struct StubGateway {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(Vec<Turn>, String)>>>,
    failure: Option<GatewayError>,
    /// Session events already published when the call started
    events: Arc<Mutex<Option<UnboundedReceiver<SessionEvent>>>>,
    events_at_call: Arc<Mutex<Vec<SessionEvent>>>,
}

impl StubGateway {
    fn failing(err: GatewayError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    async fn generate(&self, history: &[Turn], utterance: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((history.to_vec(), utterance.to_string()));

        if let Some(rx) = self.events.lock().unwrap().as_mut() {
            let mut observed = self.events_at_call.lock().unwrap();
            while let Ok(event) = rx.try_recv() {
                observed.push(event);
            }
        }

        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok("D.".to_string()),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn registry() -> FaqRegistry {
    FaqRegistry::new(vec![FaqEntry::new("A?", "B."), FaqEntry::new("E?", "F.")]).unwrap()
}

fn session(gateway: StubGateway) -> SessionManager<StubGateway> {
    let mut manager = SessionManager::new(SessionStore::new(GREETING), registry(), gateway);
    manager.initialize();
    manager
}

/// Every user turn is immediately followed by an assistant turn
fn assert_alternation(transcript: &[Turn]) {
    assert_eq!(transcript[0].role(), Speaker::Assistant);
    for pair in transcript[1..].chunks(2) {
        assert_eq!(pair.len(), 2, "unanswered user turn in {:?}", transcript);
        assert_eq!(pair[0].role(), Speaker::User);
        assert_eq!(pair[1].role(), Speaker::Assistant);
    }
}

#[test]
fn initialize_yields_single_assistant_greeting() {
    let mut store = SessionStore::new(GREETING);
    store.initialize();

    assert_eq!(store.snapshot().len(), 1);
    assert_eq!(store.snapshot()[0].role(), Speaker::Assistant);
}

#[test]
fn initialize_twice_does_not_duplicate_greeting() {
    let gateway = StubGateway::default();
    let mut manager = session(gateway);
    manager.initialize();

    assert_eq!(manager.snapshot(), &[Turn::assistant(GREETING)]);
}

#[test]
fn faq_selection_appends_pair_without_gateway() {
    let gateway = StubGateway::default();
    let mut manager = session(gateway.clone());
    let faq = registry();

    for entry in faq.entries() {
        let before = manager.snapshot().len();
        let outcome = manager.handle_faq_selection(&entry.question).unwrap();

        assert_eq!(outcome, TurnOutcome::FaqAnswered);
        assert_eq!(
            &manager.snapshot()[before..],
            &[
                Turn::user(entry.question.clone()),
                Turn::assistant(entry.answer.clone())
            ]
        );
    }
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn typed_faq_question_matches_faq_selection() {
    let selected_gateway = StubGateway::default();
    let mut selected = session(selected_gateway.clone());
    selected.handle_faq_selection("E?").unwrap();

    let typed_gateway = StubGateway::default();
    let mut typed = session(typed_gateway.clone());
    typed.handle_free_text("E?").await.unwrap();

    assert_eq!(selected.snapshot(), typed.snapshot());
    assert_eq!(typed_gateway.calls(), 0);
}

#[tokio::test]
async fn free_text_user_turn_is_visible_before_reply() {
    let gateway = StubGateway::default();
    let mut manager = SessionManager::new(SessionStore::new(GREETING), registry(), gateway.clone());
    let rx = manager.subscribe();
    *gateway.events.lock().unwrap() = Some(rx);

    manager.initialize();
    let outcome = manager.handle_free_text("C?").await.unwrap();

    assert_eq!(outcome, TurnOutcome::LlmAnswered);
    assert_eq!(
        *gateway.events_at_call.lock().unwrap(),
        vec![
            SessionEvent::TurnAppended(Turn::assistant(GREETING)),
            SessionEvent::TurnAppended(Turn::user("C?")),
            SessionEvent::Pending,
        ]
    );

    // History handed to the gateway stops before the in-flight utterance
    let seen = gateway.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (vec![Turn::assistant(GREETING)], "C?".to_string()));

    let assistant_turns = manager.snapshot()[1..]
        .iter()
        .filter(|t| t.role() == Speaker::Assistant)
        .count();
    assert_eq!(assistant_turns, 1);
}

#[tokio::test]
async fn transport_failure_is_reported_as_assistant_turn() {
    let gateway = StubGateway::failing(GatewayError::Transport("network unreachable".to_string()));
    let mut manager = session(gateway.clone());

    let outcome = manager.handle_free_text("C?").await.unwrap();

    assert!(matches!(outcome, TurnOutcome::LlmFailed(GatewayError::Transport(_))));
    let last = manager.snapshot().last().unwrap();
    assert_eq!(last.role(), Speaker::Assistant);
    assert!(last.content().contains("network unreachable"));
    assert_alternation(manager.snapshot());
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn failed_turn_is_not_retried() {
    let gateway = StubGateway::failing(GatewayError::Config("no key".to_string()));
    let mut manager = session(gateway.clone());

    manager.handle_free_text("C?").await.unwrap();
    manager.handle_free_text("C?").await.unwrap();

    assert_eq!(gateway.calls(), 2);
    assert_eq!(manager.snapshot().len(), 5);
    assert_alternation(manager.snapshot());
}

#[tokio::test]
async fn mixed_sequence_produces_expected_transcript() {
    let gateway = StubGateway::default();
    let mut manager = SessionManager::new(
        SessionStore::new(GREETING),
        FaqRegistry::new(vec![FaqEntry::new("A?", "B.")]).unwrap(),
        gateway.clone(),
    );
    manager.initialize();

    manager.handle_faq_selection("A?").unwrap();
    manager.handle_free_text("A?").await.unwrap();
    manager.handle_free_text("C?").await.unwrap();

    assert_eq!(
        manager.snapshot(),
        &[
            Turn::assistant(GREETING),
            Turn::user("A?"),
            Turn::assistant("B."),
            Turn::user("A?"),
            Turn::assistant("B."),
            Turn::user("C?"),
            Turn::assistant("D."),
        ]
    );
    assert_eq!(gateway.calls(), 1);

    // The remote call saw everything before "C?", with both FAQ exchanges
    let seen = gateway.seen.lock().unwrap();
    assert_eq!(seen[0].0, manager.snapshot()[..5].to_vec());
}
