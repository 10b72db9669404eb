//! Playback controller
//!
//! The owning view of a [`PlaybackSession`]. It executes the session's effects
//! (resolver calls, timers, element commands) and feeds every asynchronous
//! outcome back through one input channel, so all state changes happen on the
//! task that drives the controller.
//!
//! Resolver results, timer shots and element events are tagged with the
//! session generation they belong to; the session drops anything stale.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::resolver::{ResolutionFailure, Resolve};
use crate::models::{MediaLocation, PlaybackTarget};
use crate::playback::element::{ElementEvent, ElementSink, MediaElement};
use crate::playback::gesture::{GestureInterpreter, SeekZone, Tap};
use crate::playback::overlay::Overlay;
use crate::playback::session::{Effect, PlaybackSession, RetryPolicy, SessionState};
use crate::playback::timer::ScopedTimer;

// =============================================================================
// Inputs and Events
// =============================================================================

/// Asynchronous outcomes delivered to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    Resolved {
        generation: u64,
        result: Result<MediaLocation, ResolutionFailure>,
    },
    RetryElapsed {
        generation: u64,
    },
    Element {
        generation: u64,
        event: ElementEvent,
    },
    HideOverlay {
        token: u64,
    },
}

/// Notifications for whoever owns the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    StateChanged(SessionState),
    /// The session wants this target next; the owner retargets or closes
    AdvanceRequested(PlaybackTarget),
    /// A double-tap landed in a seek zone
    Seeked(SeekZone),
}

// =============================================================================
// Controller
// =============================================================================

pub struct PlayerController<E: MediaElement> {
    session: PlaybackSession,
    resolver: Arc<dyn Resolve>,
    element: E,
    overlay: Overlay,
    gestures: GestureInterpreter,
    retry_timer: ScopedTimer<PlayerInput>,
    tx: UnboundedSender<PlayerInput>,
    rx: UnboundedReceiver<PlayerInput>,
    events: Vec<PlayerEvent>,
}

impl<E: MediaElement> PlayerController<E> {
    /// Open a session on `target` and start resolving it
    pub async fn open(
        resolver: Arc<dyn Resolve>,
        element: E,
        target: PlaybackTarget,
        auto_advance: bool,
    ) -> Self {
        Self::with_policy(resolver, element, target, auto_advance, RetryPolicy::default()).await
    }

    pub async fn with_policy(
        resolver: Arc<dyn Resolve>,
        element: E,
        target: PlaybackTarget,
        auto_advance: bool,
        policy: RetryPolicy,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (session, effects) = PlaybackSession::with_policy(target, auto_advance, policy);
        let mut controller = Self {
            session,
            resolver,
            element,
            overlay: Overlay::new(tx.clone()),
            gestures: GestureInterpreter::new(),
            retry_timer: ScopedTimer::new(tx.clone()),
            tx,
            rx,
            events: Vec::new(),
        };
        controller.apply(effects).await;
        controller
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn target(&self) -> &PlaybackTarget {
        self.session.target()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_timer.is_pending()
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    /// Drain notifications accumulated since the last call
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // Input loop
    // -------------------------------------------------------------------------

    /// Wait for the next asynchronous outcome
    ///
    /// Never returns `None` while the controller is alive, since it holds a
    /// sender itself.
    pub async fn next_input(&mut self) -> Option<PlayerInput> {
        self.rx.recv().await
    }

    /// Take an outcome that is already waiting, if any
    pub fn try_next_input(&mut self) -> Option<PlayerInput> {
        self.rx.try_recv().ok()
    }

    /// Wait for one input and apply it
    pub async fn step(&mut self) {
        if let Some(input) = self.next_input().await {
            self.handle(input).await;
        }
    }

    /// Apply every input that is already waiting; returns how many
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(input) = self.try_next_input() {
            self.handle(input).await;
            handled += 1;
        }
        handled
    }

    /// Apply one asynchronous outcome
    pub async fn handle(&mut self, input: PlayerInput) {
        let effects = match input {
            PlayerInput::Resolved { generation, result } => {
                self.session.on_resolved(generation, result)
            }
            PlayerInput::RetryElapsed { generation } => self.session.on_retry_elapsed(generation),
            PlayerInput::Element { generation, event } => {
                self.session.on_element(generation, event)
            }
            PlayerInput::HideOverlay { token } => {
                self.overlay.on_hide(token);
                Vec::new()
            }
        };
        self.apply(effects).await;
    }

    // -------------------------------------------------------------------------
    // User and owner actions
    // -------------------------------------------------------------------------

    /// A tap on the playback surface
    pub async fn tap(&mut self, tap: Tap) {
        self.overlay.reveal();
        if let Some(zone) = self.gestures.on_tap(tap) {
            if let Some(offset) = zone.offset() {
                debug!(?zone, offset, "double-tap seek");
                self.seek_by(offset).await;
            }
            self.events.push(PlayerEvent::Seeked(zone));
        }
    }

    /// A tap at column `x` of a surface `width` wide, happening now
    pub async fn tap_at(&mut self, x: f64, width: f64) {
        self.tap(Tap::new(Instant::now(), x, width)).await;
    }

    /// Any interaction that should bring the controls up without a gesture
    pub fn reveal_overlay(&mut self) {
        self.overlay.reveal();
    }

    pub async fn toggle(&mut self) {
        let effects = self.session.toggle();
        self.apply(effects).await;
    }

    pub async fn seek_by(&mut self, seconds: f64) {
        let effects = self.session.seek_by(seconds);
        self.apply(effects).await;
    }

    pub async fn replay(&mut self) {
        let effects = self.session.replay();
        self.apply(effects).await;
    }

    pub async fn retry(&mut self) {
        let effects = self.session.retry();
        self.apply(effects).await;
    }

    pub async fn next(&mut self) {
        let effects = self.session.next();
        self.apply(effects).await;
    }

    /// Point the session at a new episode
    pub async fn retarget(&mut self, target: PlaybackTarget) {
        self.gestures.reset();
        let effects = self.session.retarget(target);
        self.apply(effects).await;
    }

    pub async fn close(&mut self) {
        self.gestures.reset();
        let effects = self.session.close();
        self.apply(effects).await;
        self.overlay.hide();
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.session.set_auto_advance(enabled);
    }

    // -------------------------------------------------------------------------
    // Effect execution
    // -------------------------------------------------------------------------

    async fn apply(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Resolve { generation, target } => self.spawn_resolve(generation, target),
                Effect::ScheduleRetry { generation, delay } => {
                    self.retry_timer
                        .schedule(delay, PlayerInput::RetryElapsed { generation });
                }
                Effect::CancelRetry => {
                    self.retry_timer.cancel();
                }
                Effect::Element(command) => {
                    let generation = self.session.generation();
                    let sink = ElementSink::new(self.tx.clone(), generation);
                    if let Err(e) = self.element.apply(command, &sink).await {
                        if e.is_fatal() {
                            let followups = self
                                .session
                                .on_element(generation, ElementEvent::Error(e.to_string()));
                            queue.extend(followups);
                        } else {
                            warn!(error = %e, "player command ignored");
                        }
                    }
                }
                Effect::StateChanged(state) => {
                    self.overlay.on_session_state(&state);
                    self.events.push(PlayerEvent::StateChanged(state));
                }
                Effect::AdvanceRequested(target) => {
                    self.events.push(PlayerEvent::AdvanceRequested(target));
                }
            }
        }
    }

    fn spawn_resolve(&self, generation: u64, target: PlaybackTarget) {
        debug!(generation, episode = %target, "resolving media location");
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&target).await;
            // Controller gone means nobody cares about the result
            let _ = tx.send(PlayerInput::Resolved { generation, result });
        });
    }
}
