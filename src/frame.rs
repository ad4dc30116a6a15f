//! Per-refresh frame driver
//!
//! The host calls [`FrameScheduler::tick`] from its animation callback. A tick:
//! 1. clamps dt to 40 ms
//! 2. drains queued input into the game
//! 3. updates and renders, catching any error
//! 4. always enforces the store caps
//! 5. reports score changes and, once, the round summary
//!
//! Errors never stop the loop; only the game's terminal flag does.

use serde::{Deserialize, Serialize};

use crate::Viewport;
use crate::clamp_dt;
use crate::error::FrameError;
use crate::renderer::compositor::draw_error_overlay;
use crate::renderer::{AssetCatalog, Surface};
use crate::sim::input::{InputEvent, InputQueue};

/// Mode-specific tally reported with the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundTally {
    /// Hazards that reached the sketch hero
    Hits(u32),
    /// Coins collected by the runner
    Coins(u32),
}

/// Sent once to the host when a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    #[serde(flatten)]
    pub tally: RoundTally,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Schedule another frame
    Continue,
    /// Round over; do not reschedule
    Terminated,
}

/// A game mode driven by the scheduler
pub trait Game {
    /// Reset every store and start a round at `now_ms`
    fn start(&mut self, now_ms: f64, view: Viewport);

    fn handle_input(&mut self, event: InputEvent, view: Viewport);

    fn update(&mut self, now_ms: f64, dt: f32, view: Viewport) -> Result<(), FrameError>;

    fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
        view: Viewport,
    ) -> Result<(), FrameError>;

    /// Truncate stores to their caps; returns how many entries were dropped
    fn enforce_caps(&mut self) -> usize;

    /// Seconds since round start
    fn elapsed_secs(&self) -> f32;

    /// Integer score shown to the host
    fn score(&self) -> u32 {
        self.elapsed_secs().max(0.0).floor() as u32
    }

    fn is_terminal(&self) -> bool;

    fn summary(&self) -> RoundSummary;
}

type ScoreCallback = Box<dyn FnMut(u32)>;
type SummaryCallback = Box<dyn FnMut(RoundSummary)>;

/// Drives one [`Game`] frame by frame
pub struct FrameScheduler<G: Game> {
    game: G,
    input: InputQueue,
    last_frame: Option<f64>,
    last_score: Option<u32>,
    running: bool,
    summary_sent: bool,
    frame_errors: u32,
    on_score: Option<ScoreCallback>,
    on_summary: Option<SummaryCallback>,
}

impl<G: Game> FrameScheduler<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            input: InputQueue::new(),
            last_frame: None,
            last_score: None,
            running: false,
            summary_sent: false,
            frame_errors: 0,
            on_score: None,
            on_summary: None,
        }
    }

    /// Called whenever the integer score changes
    pub fn on_score(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_score = Some(Box::new(f));
        self
    }

    /// Called once when the round ends
    pub fn on_summary(mut self, f: impl FnMut(RoundSummary) + 'static) -> Self {
        self.on_summary = Some(Box::new(f));
        self
    }

    /// Start (or restart) a round
    pub fn start(&mut self, now_ms: f64, view: Viewport) {
        self.input.clear();
        self.last_frame = Some(now_ms);
        self.last_score = None;
        self.summary_sent = false;
        self.running = true;
        self.frame_errors = 0;
        self.game.start(now_ms, view);
    }

    /// Stop without emitting a summary (teardown)
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Frame loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queue input for the next tick
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Frames whose body failed since the round started
    pub fn frame_errors(&self) -> u32 {
        self.frame_errors
    }

    /// Run one frame
    pub fn tick<S: Surface>(
        &mut self,
        now_ms: f64,
        view: Viewport,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
    ) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Terminated;
        }
        let dt = self.last_frame.map_or(0.0, |last| clamp_dt(now_ms, last));
        self.last_frame = Some(now_ms);

        if let Err(err) = self.run_frame(now_ms, dt, view, surface, assets) {
            self.frame_errors += 1;
            log::error!("Frame error: {}", err);
            if let Err(overlay_err) = draw_error_overlay(surface) {
                log::warn!("Error overlay could not be drawn: {}", overlay_err);
            }
        }

        let evicted = self.game.enforce_caps();
        if evicted > 0 {
            log::debug!("Cap step evicted {} entries", evicted);
        }

        self.report_score();

        if self.game.is_terminal() {
            self.finish();
            return FrameOutcome::Terminated;
        }
        FrameOutcome::Continue
    }

    fn run_frame<S: Surface>(
        &mut self,
        now_ms: f64,
        dt: f32,
        view: Viewport,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
    ) -> Result<(), FrameError> {
        if !view.is_valid() {
            return Err(FrameError::InvalidViewport {
                width: view.width,
                height: view.height,
            });
        }
        for event in self.input.drain() {
            self.game.handle_input(event, view);
        }
        self.game.update(now_ms, dt, view)?;
        self.game.render(surface, assets, view)?;
        Ok(())
    }

    fn report_score(&mut self) {
        let score = self.game.score();
        if self.last_score != Some(score) {
            self.last_score = Some(score);
            if let Some(cb) = self.on_score.as_mut() {
                cb(score);
            }
        }
    }

    fn finish(&mut self) {
        self.running = false;
        if self.summary_sent {
            return;
        }
        self.summary_sent = true;
        let summary = self.game.summary();
        log::info!("Round over: score {} ({:?})", summary.score, summary.tally);
        if let Some(cb) = self.on_summary.as_mut() {
            cb(summary);
        }
    }
}
