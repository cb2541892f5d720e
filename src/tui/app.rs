use crate::app::Config;
use crate::faq::FaqRegistry;
use crate::session::{SessionEvent, Turn, UserEvent};

/// Which widget receives Enter and the arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Faq,
}

/// Application state
///
/// The transcript here is a render-side mirror fed by [`SessionEvent`]s; the
/// session manager owns the real one.
pub struct App {
    /// Turns received so far
    pub transcript: Vec<Turn>,
    /// FAQ shortcut labels in registry order
    pub faq_questions: Vec<String>,
    /// Highlighted FAQ shortcut
    pub selected_faq: usize,
    /// Focused widget
    pub focus: Focus,
    /// User input buffer
    pub input: String,
    /// Is a gateway reply pending?
    pub pending: bool,
    /// Has a submitted turn not settled yet?
    pub in_flight: bool,
    /// Is the app running?
    pub running: bool,
    /// Scroll offset for chat view, counted up from the bottom
    pub scroll_offset: u16,
    /// Header title
    pub assistant_name: String,
    /// Model name for display
    pub model_name: String,
    /// Placeholder shown while pending
    pub pending_text: String,
    /// Show the FAQ panel
    pub show_faq_panel: bool,
    /// Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new app instance
    pub fn new(config: &Config, faq: &FaqRegistry, model_name: impl Into<String>) -> Self {
        let faq_questions: Vec<String> = faq.questions().map(str::to_string).collect();
        let show_faq_panel = config.ui.show_faq_panel && !faq_questions.is_empty();

        Self {
            transcript: Vec::new(),
            faq_questions,
            selected_faq: 0,
            focus: Focus::Input,
            input: String::new(),
            pending: false,
            in_flight: false,
            running: true,
            scroll_offset: 0,
            assistant_name: config.assistant.name.clone(),
            model_name: model_name.into(),
            pending_text: config.ui.pending_text.clone(),
            show_faq_panel,
            status_message: None,
        }
    }

    /// Fold a session notification into the render state
    pub fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TurnAppended(turn) => {
                self.transcript.push(turn);
                // Auto-scroll to bottom
                self.scroll_offset = 0;
            }
            SessionEvent::Pending => self.pending = true,
            SessionEvent::Settled => {
                self.pending = false;
                self.in_flight = false;
            }
        }
    }

    /// A submitted turn was refused before touching the transcript
    pub fn turn_rejected(&mut self, message: impl Into<String>) {
        self.in_flight = false;
        self.set_status(message);
    }

    /// Turn an Enter press into a session event for the focused widget.
    ///
    /// Nothing is submitted until the previous turn settles.
    pub fn take_submission(&mut self) -> Option<UserEvent> {
        if self.pending || self.in_flight {
            self.set_status("Aguarde a resposta anterior...");
            return None;
        }

        let submission = match self.focus {
            Focus::Input => {
                if self.input.is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.input);
                Some(UserEvent::FreeTextSubmitted(text))
            }
            Focus::Faq => self
                .faq_questions
                .get(self.selected_faq)
                .cloned()
                .map(UserEvent::FaqSelected),
        };
        self.in_flight = submission.is_some();
        submission
    }

    /// Switch focus between the input box and the FAQ panel
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.show_faq_panel => Focus::Faq,
            _ => Focus::Input,
        };
    }

    pub fn select_next_faq(&mut self) {
        if !self.faq_questions.is_empty() {
            self.selected_faq = (self.selected_faq + 1) % self.faq_questions.len();
        }
    }

    pub fn select_prev_faq(&mut self) {
        if !self.faq_questions.is_empty() {
            let len = self.faq_questions.len();
            self.selected_faq = (self.selected_faq + len - 1) % len;
        }
    }

    /// Scroll chat view up
    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}
