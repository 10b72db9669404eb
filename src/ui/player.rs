//! Watch screen
//!
//! Shows the session state in the middle of the screen, the control overlay
//! (progress and key hints) while it is visible, and the dedicated prompts for
//! the error and episode-finished states.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::WatchApp;
use crate::models::format_seconds;
use crate::playback::element::MediaElement;
use crate::playback::session::{PlaybackError, SessionState, MAX_AUTO_RETRIES};
use crate::ui::Theme;

/// Render the whole watch screen
pub fn render<E: MediaElement>(frame: &mut Frame, app: &WatchApp<E>) {
    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Theme::text()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Stage
            Constraint::Length(3), // Overlay
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_stage(frame, chunks[1], app);
    if app.controller().overlay_visible() {
        render_overlay(frame, chunks[2], app);
    }
    render_status_bar(frame, chunks[3], app);
}

fn render_header<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(app.detail.item.name.clone(), Theme::title()),
        Span::styled("  ", Theme::dimmed()),
        Span::styled(app.episode_label(), Theme::muted()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );
    frame.render_widget(header, area);
}

fn render_stage<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let session = app.controller().session();
    let lines = match app.state() {
        SessionState::Loading => {
            let mut lines = vec![Line::from(Span::styled("⟳ Buffering...", Theme::loading()))];
            if session.retry_count() > 0 {
                lines.push(Line::from(Span::styled(
                    format!("Retrying ({}/{})", session.retry_count(), MAX_AUTO_RETRIES),
                    Theme::muted(),
                )));
            }
            lines
        }
        SessionState::Ready => vec![Line::from(Span::styled(
            "Starting player...",
            Theme::loading(),
        ))],
        SessionState::Playing => vec![
            Line::from(Span::styled("▶ Playing", Theme::title())),
            Line::from(Span::styled("Click or press space for controls", Theme::dimmed())),
        ],
        SessionState::Paused => vec![Line::from(Span::styled("⏸ Paused", Theme::accent()))],
        SessionState::Error(_) => return render_error(frame, area, app),
        SessionState::EpisodeComplete => return render_complete(frame, area, app),
        SessionState::Closed => vec![Line::from(Span::styled("Closed", Theme::dimmed()))],
    };

    let stage = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(stage, centered(area, 3));
}

fn render_error<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let message = app
        .last_error
        .clone()
        .unwrap_or_else(|| PlaybackError::Resolution.to_string());

    let mut hints = vec![key_hint("r", "Retry")];
    if app.has_next() {
        hints.push(key_hint("n", "Next episode"));
    }
    hints.push(key_hint("q", "Close"));

    let prompt = Paragraph::new(vec![
        Line::from(Span::styled("Playback Error", Theme::error())),
        Line::from(""),
        Line::from(Span::styled(message, Theme::muted())),
        Line::from(""),
        Line::from(hints.concat()),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::error()),
    );
    frame.render_widget(prompt, centered(area, 7));
}

fn render_complete<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let mut lines = vec![Line::from(Span::styled("Episode Finished", Theme::title()))];
    let mut hints = Vec::new();
    if app.has_next() {
        lines.push(Line::from(Span::styled(
            format!("Up next: Episode {}", app.target().episode_index + 2),
            Theme::muted(),
        )));
        hints.push(key_hint("n", "Next"));
    }
    hints.push(key_hint("r", "Replay"));
    hints.push(key_hint("q", "Close"));
    lines.push(Line::from(""));
    lines.push(Line::from(hints.concat()));

    let prompt = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(prompt, centered(area, 6));
}

fn render_overlay<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let session = app.controller().session();
    let position = session.position();
    let (ratio, label) = match session.duration() {
        Some(duration) if duration > 0.0 => (
            (position / duration).clamp(0.0, 1.0),
            format!("{} / {}", format_seconds(position), format_seconds(duration)),
        ),
        _ => (0.0, format_seconds(position)),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let gauge = Gauge::default()
        .gauge_style(Theme::progress_bar())
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, rows[0]);

    let hints = [
        key_hint("space", "Play/Pause"),
        key_hint("←/→", "-10s/+10s"),
        key_hint("n", "Next"),
        key_hint("p", "Prev"),
        key_hint("q", "Close"),
    ]
    .concat();
    frame.render_widget(Paragraph::new(Line::from(hints)), rows[2]);
}

fn render_status_bar<E: MediaElement>(frame: &mut Frame, area: Rect, app: &WatchApp<E>) {
    let auto = if app.controller().session().auto_advance() {
        "on"
    } else {
        "off"
    };
    let mut spans = vec![
        Span::styled(format!(" {} ", app.state()), Theme::status_bar()),
        Span::styled(format!(" auto-play next: {} ", auto), Theme::status_bar()),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {} ", status), Theme::status_bar()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Theme::status_bar()),
        area,
    );
}

fn key_hint(key: &str, desc: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("[{}] ", key), Theme::keybind()),
        Span::styled(format!("{}  ", desc), Theme::keybind_desc()),
    ]
}

/// Vertically centered band of `height` rows
fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}
