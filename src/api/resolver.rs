//! Media resolution
//!
//! Turns a (title, episode) pair into a playable URL through the backend's
//! two-step handshake:
//!
//! 1. `GET /watch/{title}/{episode}` primes server-side state. Best effort:
//!    its outcome is logged and otherwise ignored.
//! 2. `POST /watch/player` returns the location under one of several shapes.
//!
//! Every failure of step 2 collapses into [`ResolutionFailure`]. Callers
//! retry or abandon the same way regardless of cause.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::client::DramaClient;
use crate::models::{MediaLocation, PlaybackTarget};

/// JSON pointers probed for the playable location, in priority order
pub const LOCATION_PATHS: &[&str] = &["/data/url", "/url", "/data/stream"];

/// Resolution did not produce a playable location
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No playable media for {target}")]
pub struct ResolutionFailure {
    pub target: PlaybackTarget,
}

impl ResolutionFailure {
    pub fn new(target: &PlaybackTarget) -> Self {
        Self {
            target: target.clone(),
        }
    }
}

/// Anything able to resolve a playback target into a media location
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, target: &PlaybackTarget) -> Result<MediaLocation, ResolutionFailure>;
}

/// Pull the first known location field out of a player response
pub fn extract_location(body: &Value) -> Option<MediaLocation> {
    LOCATION_PATHS.iter().find_map(|path| {
        body.pointer(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(MediaLocation::new)
    })
}

/// Resolver backed by the drama backend
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: DramaClient,
}

impl MediaResolver {
    pub fn new(client: DramaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resolve for MediaResolver {
    async fn resolve(&self, target: &PlaybackTarget) -> Result<MediaLocation, ResolutionFailure> {
        // TODO: gate the player call on this step once the backend owners confirm whether it is required
        if let Err(e) = self.client.prepare_watch(target).await {
            warn!(episode = %target, error = %e, "preparatory watch call failed, continuing");
        }

        let body = self.client.request_player(target).await.map_err(|e| {
            warn!(episode = %target, error = %e, "player call failed");
            ResolutionFailure::new(target)
        })?;

        match extract_location(&body) {
            Some(location) => {
                info!(episode = %target, "resolved media location");
                debug!(%location);
                Ok(location)
            }
            None => {
                warn!(episode = %target, "player response carries no known location field");
                Err(ResolutionFailure::new(target))
            }
        }
    }
}
