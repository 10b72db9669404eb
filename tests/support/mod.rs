//! Test doubles shared by the playback tests
//!
//! - `ScriptedResolver`: per-episode queue of (delay, outcome) steps
//! - `RecordingElement`: records commands and reports metadata on load

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dramatui::api::{Resolve, ResolutionFailure};
use dramatui::models::{CatalogItem, EpisodeRef, MediaLocation, PlaybackTarget, TitleDetail};
use dramatui::playback::{ElementCommand, ElementError, ElementEvent, ElementSink, MediaElement};

pub const TITLE_ID: &str = "41000102";

pub fn target(episode_index: usize) -> PlaybackTarget {
    PlaybackTarget::new(TITLE_ID, episode_index)
}

pub fn url(episode_index: usize) -> String {
    format!("https://cdn.test/{}/{}.m3u8", TITLE_ID, episode_index)
}

pub fn detail(episodes: usize) -> TitleDetail {
    TitleDetail {
        item: CatalogItem {
            id: TITLE_ID.to_string(),
            name: "The Hidden Heiress".to_string(),
            cover: String::new(),
            synopsis: String::new(),
            latest_episode: episodes.to_string(),
            score: 0.0,
            tag: String::new(),
            update_time: None,
        },
        episodes: (0..episodes)
            .map(|index| EpisodeRef {
                index,
                id: format!("c{}", index),
                name: format!("Episode {}", index + 1),
                restricted: None,
                update_time: None,
            })
            .collect(),
    }
}

// =============================================================================
// Resolver
// =============================================================================

#[derive(Debug, Clone)]
struct Step {
    delay: Duration,
    ok: bool,
}

/// Resolver answering from a per-episode script
///
/// Episodes without a scripted step resolve immediately to [`url`].
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    script: Mutex<HashMap<usize, VecDeque<Step>>>,
    calls: Mutex<Vec<PlaybackTarget>>,
}

impl ScriptedResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, episode_index: usize, delay: Duration, ok: bool) {
        self.script
            .lock()
            .unwrap()
            .entry(episode_index)
            .or_default()
            .push_back(Step { delay, ok });
    }

    /// Next resolution of `episode_index` succeeds after `delay`
    pub fn succeed(&self, episode_index: usize, delay: Duration) {
        self.push(episode_index, delay, true);
    }

    /// Next resolution of `episode_index` fails after `delay`
    pub fn fail(&self, episode_index: usize, delay: Duration) {
        self.push(episode_index, delay, false);
    }

    pub fn calls(&self) -> Vec<PlaybackTarget> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolve for ScriptedResolver {
    async fn resolve(&self, target: &PlaybackTarget) -> Result<MediaLocation, ResolutionFailure> {
        self.calls.lock().unwrap().push(target.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .get_mut(&target.episode_index)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step {
                delay: Duration::ZERO,
                ok: true,
            });

        tokio::time::sleep(step.delay).await;
        if step.ok {
            Ok(MediaLocation::new(url(target.episode_index)))
        } else {
            Err(ResolutionFailure::new(target))
        }
    }
}

// =============================================================================
// Media Element
// =============================================================================

/// Shared view of what a `RecordingElement` saw
#[derive(Debug, Clone, Default)]
pub struct ElementProbe {
    commands: Arc<Mutex<Vec<ElementCommand>>>,
    sink: Arc<Mutex<Option<ElementSink>>>,
}

impl ElementProbe {
    pub fn commands(&self) -> Vec<ElementCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// URLs loaded, in order
    pub fn loads(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                ElementCommand::Load(location) => Some(location.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                ElementCommand::SeekBy(seconds) => Some(seconds),
                _ => None,
            })
            .collect()
    }

    /// Report an event as the currently loaded media
    pub fn emit(&self, event: ElementEvent) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.emit(event);
        }
    }
}

/// Media element that records commands and reports metadata on load
#[derive(Debug, Default)]
pub struct RecordingElement {
    probe: ElementProbe,
    fail_load: bool,
}

impl RecordingElement {
    pub fn new() -> (Self, ElementProbe) {
        let element = Self::default();
        let probe = element.probe.clone();
        (element, probe)
    }

    /// An element whose loads fail as if the player were missing
    pub fn broken() -> (Self, ElementProbe) {
        let (mut element, probe) = Self::new();
        element.fail_load = true;
        (element, probe)
    }
}

#[async_trait]
impl MediaElement for RecordingElement {
    async fn apply(&mut self, command: ElementCommand, sink: &ElementSink) -> Result<(), ElementError> {
        self.probe.commands.lock().unwrap().push(command.clone());
        match command {
            ElementCommand::Load(_) | ElementCommand::Restart => {
                if self.fail_load {
                    return Err(ElementError::NotFound("fake-player".into()));
                }
                *self.probe.sink.lock().unwrap() = Some(sink.clone());
                sink.emit(ElementEvent::MetadataLoaded {
                    duration: Some(120.0),
                });
            }
            ElementCommand::Unload => {
                *self.probe.sink.lock().unwrap() = None;
            }
            _ => {}
        }
        Ok(())
    }
}
