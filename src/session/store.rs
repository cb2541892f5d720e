use super::turn::Turn;

/// Process-lifetime transcript of a single conversation.
///
/// The store only grows: there is no removal, and the greeting appended by
/// [`SessionStore::initialize`] stays at index 0 for the whole session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    greeting: String,
    turns: Vec<Turn>,
}

impl SessionStore {
    /// Create an empty store that will greet with `greeting` on first use
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            turns: Vec::new(),
        }
    }

    /// Seed the transcript with the greeting if it is still empty.
    ///
    /// Returns `true` when the greeting was appended by this call.
    pub fn initialize(&mut self) -> bool {
        if self.is_initialized() {
            return false;
        }
        self.turns.push(Turn::assistant(self.greeting.clone()));
        true
    }

    /// Add a turn to the end of the transcript
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full transcript in chronological order
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        !self.turns.is_empty()
    }
}
