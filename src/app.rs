//! Watch screen state and input handling
//!
//! `WatchApp` owns the playback controller for one title. It turns keys and
//! mouse clicks into controller actions, follows advance requests across the
//! episode list, and records which episodes actually started.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::info;

use crate::api::resolver::Resolve;
use crate::models::{PlaybackTarget, TitleDetail};
use crate::playback::controller::{PlayerController, PlayerEvent};
use crate::playback::element::MediaElement;
use crate::playback::gesture::SEEK_STEP_SECS;
use crate::playback::session::SessionState;

/// Why the watch screen stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// User closed the player
    Closed,
    /// Advance requested past the last episode
    EndOfSeries,
}

/// Watch screen for one title
pub struct WatchApp<E: MediaElement> {
    pub detail: TitleDetail,
    controller: PlayerController<E>,
    /// Episode indexes that reached playback, in order
    started: Vec<usize>,
    last_started: Option<PlaybackTarget>,
    /// Whether the app is still running
    pub running: bool,
    pub exit_reason: Option<ExitReason>,
    /// Last error shown on the error screen
    pub last_error: Option<String>,
    /// Transient line for the status bar
    pub status: Option<String>,
}

impl<E: MediaElement> WatchApp<E> {
    /// Open the player on `episode_index` of `detail`
    pub async fn start(
        detail: TitleDetail,
        resolver: Arc<dyn Resolve>,
        element: E,
        episode_index: usize,
        auto_advance: bool,
    ) -> Self {
        let target = PlaybackTarget::new(detail.item.id.clone(), episode_index);
        let controller = PlayerController::open(resolver, element, target, auto_advance).await;
        let mut app = Self {
            detail,
            controller,
            started: Vec::new(),
            last_started: None,
            running: true,
            exit_reason: None,
            last_error: None,
            status: None,
        };
        app.process_events().await;
        app
    }

    pub fn controller(&self) -> &PlayerController<E> {
        &self.controller
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    pub fn target(&self) -> &PlaybackTarget {
        self.controller.target()
    }

    /// Episode indexes that started playing
    pub fn started(&self) -> &[usize] {
        &self.started
    }

    /// Display title for the current episode
    pub fn episode_label(&self) -> String {
        let index = self.target().episode_index;
        match self.detail.episode(index) {
            Some(episode) => format!("EP {} · {}", episode.number(), episode.name),
            None => format!("EP {}", index + 1),
        }
    }

    /// Whether the title has an episode after the current one
    pub fn has_next(&self) -> bool {
        self.within_series(&self.target().next())
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Handle a key press
    pub async fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit(ExitReason::Closed).await;
            return;
        }

        match key.code {
            KeyCode::Char(' ') => {
                self.controller.reveal_overlay();
                self.controller.toggle().await;
            }
            KeyCode::Left => {
                self.controller.reveal_overlay();
                self.controller.seek_by(-SEEK_STEP_SECS).await;
            }
            KeyCode::Right => {
                self.controller.reveal_overlay();
                self.controller.seek_by(SEEK_STEP_SECS).await;
            }
            KeyCode::Char('n') => self.controller.next().await,
            KeyCode::Char('p') => self.previous().await,
            KeyCode::Char('r') => match self.state() {
                SessionState::EpisodeComplete => self.controller.replay().await,
                _ => self.controller.retry().await,
            },
            KeyCode::Char('a') => {
                let enabled = !self.controller.session().auto_advance();
                self.controller.set_auto_advance(enabled);
                self.status = Some(format!(
                    "Auto-play next {}",
                    if enabled { "on" } else { "off" }
                ));
            }
            KeyCode::Char('q') | KeyCode::Esc => self.quit(ExitReason::Closed).await,
            _ => {}
        }

        self.process_events().await;
    }

    /// Handle a mouse event on a surface `width` columns wide
    pub async fn handle_mouse(&mut self, mouse: MouseEvent, width: u16) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            self.controller
                .tap_at(f64::from(mouse.column), f64::from(width))
                .await;
            self.process_events().await;
        }
    }

    /// Apply asynchronous outcomes that arrived since the last call
    pub async fn pump(&mut self) {
        if self.controller.drain().await > 0 {
            self.process_events().await;
        }
    }

    /// Wait for one asynchronous outcome and apply it
    pub async fn step(&mut self) {
        self.controller.step().await;
        self.process_events().await;
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn previous(&mut self) {
        match self.target().previous() {
            Some(target) => self.controller.retarget(target).await,
            None => self.status = Some("Already at the first episode".into()),
        }
    }

    async fn quit(&mut self, reason: ExitReason) {
        self.controller.close().await;
        self.running = false;
        self.exit_reason = Some(reason);
    }

    fn within_series(&self, target: &PlaybackTarget) -> bool {
        // Unknown length: let resolution decide
        let count = self.detail.episode_count();
        count == 0 || target.episode_index < count
    }

    async fn process_events(&mut self) {
        // Advancing produces new events, so loop until quiet
        loop {
            let events = self.controller.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.on_event(event).await;
            }
        }
    }

    async fn on_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::StateChanged(SessionState::Playing) => {
                let target = self.target().clone();
                if self.last_started.as_ref() != Some(&target) {
                    info!(episode = %target, title = %self.detail.item.name, "episode started");
                    self.started.push(target.episode_index);
                    self.last_started = Some(target);
                }
            }
            PlayerEvent::StateChanged(SessionState::Loading) => {
                self.last_error = None;
            }
            PlayerEvent::StateChanged(SessionState::Error(error)) => {
                self.last_error = Some(error.to_string());
            }
            PlayerEvent::StateChanged(_) | PlayerEvent::Seeked(_) => {}
            PlayerEvent::AdvanceRequested(target) => {
                if self.within_series(&target) {
                    self.controller.retarget(target).await;
                } else {
                    info!(title = %self.detail.item.name, "reached the last episode");
                    self.quit(ExitReason::EndOfSeries).await;
                }
            }
        }
    }
}
