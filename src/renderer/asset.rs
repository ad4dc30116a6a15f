//! Media handles and the readiness gate
//!
//! Images and videos load asynchronously on the host. Every draw asks the
//! handle whether it is ready; a handle that is not gets a flat placeholder.
//! Playback requests report their outcome instead of raising.

use std::cell::Cell;
use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod consts {
    /// Minimum spacing between background playback retries (ms)
    pub const PLAYBACK_RETRY_MS: f64 = 1500.0;
}

use consts::*;

/// Outcome of asking a media element to play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackResult {
    Played,
    /// Autoplay policy wants a user gesture first
    DeferredPendingGesture,
    Failed(String),
}

/// A decoded-or-loading image or video
pub trait MediaSource {
    fn key(&self) -> &str;

    /// Intrinsic size, `None` until known
    fn natural_size(&self) -> Option<Vec2>;

    /// Decoding finished (image `complete`, video has current data)
    fn is_decoded(&self) -> bool;

    fn is_video(&self) -> bool {
        false
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn request_play(&self) -> PlaybackResult {
        PlaybackResult::Played
    }

    /// Decoded, has dimensions, and playing when it is a video
    fn is_ready(&self) -> bool {
        self.is_decoded()
            && self.natural_size().is_some_and(|s| s.x > 0.0 && s.y > 0.0)
            && (!self.is_video() || self.is_playing())
    }
}

/// In-memory media for headless runs and tests
#[derive(Debug, Clone)]
pub struct StaticMedia {
    key: String,
    size: Option<Vec2>,
    decoded: bool,
    video: bool,
    playing: Cell<bool>,
    /// Result returned by the next `request_play`
    play_result: PlaybackResult,
}

impl StaticMedia {
    /// Decoded image of the given size
    pub fn image(key: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            key: key.into(),
            size: Some(Vec2::new(width, height)),
            decoded: true,
            video: false,
            playing: Cell::new(false),
            play_result: PlaybackResult::Played,
        }
    }

    /// Video that starts paused
    pub fn video(key: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            video: true,
            ..Self::image(key, width, height)
        }
    }

    /// Still loading
    pub fn pending(key: impl Into<String>) -> Self {
        Self {
            size: None,
            decoded: false,
            ..Self::image(key, 0.0, 0.0)
        }
    }

    pub fn with_play_result(mut self, result: PlaybackResult) -> Self {
        self.play_result = result;
        self
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.set(playing);
    }
}

impl MediaSource for StaticMedia {
    fn key(&self) -> &str {
        &self.key
    }

    fn natural_size(&self) -> Option<Vec2> {
        self.size
    }

    fn is_decoded(&self) -> bool {
        self.decoded
    }

    fn is_video(&self) -> bool {
        self.video
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }

    fn request_play(&self) -> PlaybackResult {
        if self.play_result == PlaybackResult::Played {
            self.playing.set(true);
        }
        self.play_result.clone()
    }
}

/// Key to media handle map supplied by the host
#[derive(Debug)]
pub struct AssetCatalog<M> {
    media: HashMap<String, M>,
}

impl<M> Default for AssetCatalog<M> {
    fn default() -> Self {
        Self { media: HashMap::new() }
    }
}

impl<M: MediaSource> AssetCatalog<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the media's own key
    pub fn insert(&mut self, media: M) {
        self.media.insert(media.key().to_string(), media);
    }

    /// Handle regardless of readiness
    pub fn get(&self, key: &str) -> Option<&M> {
        self.media.get(key)
    }

    /// Handle only when it passes the readiness gate
    pub fn ready(&self, key: &str) -> Option<&M> {
        self.media.get(key).filter(|m| m.is_ready())
    }

    /// First ready handle in precedence order
    pub fn first_ready<'a>(&'a self, keys: &[&str]) -> Option<&'a M> {
        keys.iter().find_map(|k| self.ready(k))
    }

    pub fn remove(&mut self, key: &str) -> Option<M> {
        self.media.remove(key)
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

/// Throttles background video playback attempts
///
/// The first attempt is always allowed. After that, retries need a user
/// gesture to have unlocked media and at least 1500 ms since the last try.
#[derive(Debug, Clone, Default)]
pub struct PlaybackGate {
    unlocked: bool,
    last_attempt: Option<f64>,
}

impl PlaybackGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call from a pointer/key handler
    pub fn unlock(&mut self) {
        if !self.unlocked {
            log::debug!("Media playback unlocked by user gesture");
        }
        self.unlocked = true;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn should_attempt(&self, now_ms: f64) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => self.unlocked && now_ms - last >= PLAYBACK_RETRY_MS,
        }
    }

    /// Ask a paused video to play when allowed; `None` when nothing was tried
    pub fn poll<M: MediaSource>(&mut self, media: &M, now_ms: f64) -> Option<PlaybackResult> {
        if !media.is_video() || media.is_playing() || !self.should_attempt(now_ms) {
            return None;
        }
        self.last_attempt = Some(now_ms);
        let result = media.request_play();
        match &result {
            PlaybackResult::Played => log::debug!("Playing '{}'", media.key()),
            PlaybackResult::DeferredPendingGesture => {
                log::warn!("Playback of '{}' deferred until a user gesture", media.key())
            }
            PlaybackResult::Failed(reason) => log::warn!("Playback of '{}' failed: {}", media.key(), reason),
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness() {
        assert!(StaticMedia::image("a", 10.0, 10.0).is_ready());
        assert!(!StaticMedia::pending("a").is_ready());
        assert!(!StaticMedia::image("a", 0.0, 10.0).is_ready());
        let v = StaticMedia::video("v", 640.0, 360.0);
        assert!(!v.is_ready());
        v.set_playing(true);
        assert!(v.is_ready());
    }

    #[test]
    fn test_catalog_gate() {
        let mut cat = AssetCatalog::new();
        cat.insert(StaticMedia::pending("bg"));
        cat.insert(StaticMedia::image("rock", 32.0, 32.0));
        assert!(cat.get("bg").is_some());
        assert!(cat.ready("bg").is_none());
        assert!(cat.ready("missing").is_none());
        assert_eq!(cat.first_ready(&["bg", "rock"]).map(|m| m.key()), Some("rock"));
    }

    #[test]
    fn test_playback_retry_needs_unlock() {
        let mut gate = PlaybackGate::new();
        let v = StaticMedia::video("video_desert", 640.0, 360.0)
            .with_play_result(PlaybackResult::DeferredPendingGesture);
        assert_eq!(gate.poll(&v, 0.0), Some(PlaybackResult::DeferredPendingGesture));
        // Locked: no retry however long we wait
        assert_eq!(gate.poll(&v, 10_000.0), None);
        gate.unlock();
        assert!(gate.poll(&v, 10_000.0).is_some());
        assert_eq!(gate.poll(&v, 11_000.0), None);
        assert!(gate.poll(&v, 11_500.0).is_some());
    }

    #[test]
    fn test_playing_video_not_retried() {
        let mut gate = PlaybackGate::new();
        let v = StaticMedia::video("v", 640.0, 360.0);
        assert_eq!(gate.poll(&v, 0.0), Some(PlaybackResult::Played));
        assert!(v.is_playing());
        gate.unlock();
        assert_eq!(gate.poll(&v, 5000.0), None);
    }
}
