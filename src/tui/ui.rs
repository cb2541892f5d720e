use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::error;

use crate::constants::{UI_REFRESH_INTERVAL_MS, UI_SCROLL_LINES};
use crate::models::LlmGateway;
use crate::session::{SessionEvent, SessionManager, UserEvent};
use crate::tui::app::{App, Focus};
use crate::tui::render::render_ui;

type SharedSession = Arc<Mutex<SessionManager<Box<dyn LlmGateway>>>>;

/// Run the terminal UI until the user quits
pub async fn run_ui(mut app: App, mut manager: SessionManager<Box<dyn LlmGateway>>) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ emi requires an interactive terminal.");
        eprintln!("   Use --prompt for one-shot questions from scripts or pipes.");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    let mut events = manager.subscribe();
    manager.initialize();
    let session: SharedSession = Arc::new(Mutex::new(manager));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Errors from turns that were rejected before touching the transcript
    let (err_tx, mut err_rx) = mpsc::unbounded_channel::<String>();

    let res = run_app(&mut terminal, &mut app, session, &mut events, err_tx, &mut err_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        eprintln!("Error: {:?}", err);
    }

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: SharedSession,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    err_tx: mpsc::UnboundedSender<String>,
    err_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    loop {
        // Fold in everything the session published since the last frame
        while let Ok(event) = events.try_recv() {
            app.apply_event(event);
        }
        while let Ok(message) = err_rx.try_recv() {
            app.turn_rejected(message);
        }

        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.quit();
        }

        match (key.code, app.focus) {
            (KeyCode::Esc, _) => app.quit(),
            (KeyCode::Tab, _) => app.toggle_focus(),
            (KeyCode::Enter, _) => {
                if let Some(user_event) = app.take_submission() {
                    app.clear_status();
                    spawn_turn(session.clone(), user_event, err_tx.clone());
                }
            }
            (KeyCode::Up, Focus::Faq) => app.select_prev_faq(),
            (KeyCode::Down, Focus::Faq) => app.select_next_faq(),
            (KeyCode::Up, Focus::Input) | (KeyCode::PageUp, _) => app.scroll_up(UI_SCROLL_LINES),
            (KeyCode::Down, Focus::Input) | (KeyCode::PageDown, _) => {
                app.scroll_down(UI_SCROLL_LINES)
            }
            (KeyCode::Backspace, Focus::Input) => {
                app.input.pop();
            }
            (KeyCode::Char(c), Focus::Input) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.input.push(c);
            }
            _ => {}
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}

/// Handle one user event off the render loop; the transcript reaches the UI
/// through the session's event channel
fn spawn_turn(session: SharedSession, event: UserEvent, err_tx: mpsc::UnboundedSender<String>) {
    tokio::spawn(async move {
        let mut manager = session.lock().await;
        if let Err(e) = manager.handle_event(event).await {
            error!(error = %e, "turn rejected");
            let _ = err_tx.send(e.to_string());
        }
    });
}
