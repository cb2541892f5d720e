use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::session::Speaker;
use crate::tui::app::{App, Focus};

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let faq_height = if app.show_faq_panel {
        // One row per question plus borders, capped so the chat keeps room
        (app.faq_questions.len() as u16 + 2).min(8)
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(3),          // Header
                Constraint::Length(faq_height), // FAQ shortcuts
                Constraint::Min(6),             // Transcript
                Constraint::Length(3),          // Input
                Constraint::Length(1),          // Status bar
            ]
            .as_ref() as &[Constraint],
        )
        .split(frame.area());

    render_header(frame, chunks[0], app);
    if app.show_faq_panel {
        render_faq(frame, chunks[1], app);
    }
    render_chat(frame, chunks[2], app);
    render_input(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_text = vec![Line::from(vec![
        Span::styled(
            &app.assistant_name,
            Style::default()
                .fg(Color::Rgb(0, 86, 145))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Model: "),
        Span::styled(&app.model_name, Style::default().fg(Color::Green)),
    ])];

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

/// Render the FAQ shortcut list
fn render_faq(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .faq_questions
        .iter()
        .map(|question| ListItem::new(Line::from(question.as_str())))
        .collect();

    let focused = app.focus == Focus::Faq;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Perguntas Frequentes (Tab para selecionar) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected_faq));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Build the transcript lines, pending placeholder included
fn transcript_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    for turn in &app.transcript {
        let role_color = match turn.role() {
            Speaker::User => Color::Blue,
            Speaker::Assistant => Color::Green,
        };

        lines.push(Line::from(vec![Span::styled(
            format!("[{}] ", turn.role().display_name()),
            Style::default().fg(role_color).add_modifier(Modifier::BOLD),
        )]));

        for line in turn.content().lines() {
            lines.push(Line::from(line.to_string()));
        }

        lines.push(Line::from("")); // Empty line between messages
    }

    if app.pending {
        lines.push(Line::from(vec![Span::styled(
            format!("[{}] ", Speaker::Assistant.display_name()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(vec![Span::styled(
            app.pending_text.clone(),
            Style::default()
                .fg(Color::Rgb(150, 150, 150))
                .add_modifier(Modifier::ITALIC | Modifier::SLOW_BLINK),
        )]));
    }

    lines
}

/// Estimate rendered rows once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width) as u16)
        .fold(0u16, u16::saturating_add)
}

/// Render the chat area, pinned to the newest turn unless scrolled back
fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let lines = transcript_lines(app);

    let inner_width = area.width.saturating_sub(2);
    let viewport = area.height.saturating_sub(2);
    let bottom = wrapped_height(&lines, inner_width).saturating_sub(viewport);
    let scroll = bottom.saturating_sub(app.scroll_offset);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Conversa ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Render the input area
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Input;

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused {
                    Color::Cyan
                } else {
                    Color::DarkGray
                }))
                .title(" Digite sua pergunta aqui... "),
        );

    frame.render_widget(input, area);

    if focused {
        let cursor_offset = app.input.chars().count() as u16;
        let cursor_x = (area.x + 1 + cursor_offset).min(area.x + area.width.saturating_sub(2));
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_text = if let Some(status) = &app.status_message {
        status.clone()
    } else if app.pending {
        "Aguardando resposta...".to_string()
    } else {
        "Pronto".to_string()
    };

    let spans = vec![
        Span::styled(
            " CHAT ",
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(status_text),
        Span::raw(" | "),
        Span::styled("Tab: FAQ/input", Style::default().fg(Color::DarkGray)),
        Span::raw(" | "),
        Span::styled("Ctrl+C: quit", Style::default().fg(Color::DarkGray)),
    ];

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .style(Style::default().bg(Color::Black))
        .block(Block::default());

    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use crate::faq::FaqRegistry;
    use crate::session::{SessionEvent, Turn};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_shows_faq_and_pending_placeholder() {
        let mut app = App::new(&Config::default(), &FaqRegistry::builtin(), "gemini-test");
        app.apply_event(SessionEvent::TurnAppended(Turn::user("Pergunta livre")));
        app.apply_event(SessionEvent::Pending);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render_ui(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Perguntas Frequentes"));
        assert!(text.contains("Pergunta livre"));
        assert!(text.contains("Digitando..."));
    }

    #[test]
    fn test_wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::from("abcdef"), Line::from("")];
        assert_eq!(wrapped_height(&lines, 4), 3);
    }
}
