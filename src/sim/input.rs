//! Host input, queued between frames

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Normalized input in CSS pixels relative to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
    /// Primary-button press used for tap-to-damage
    Tap(Vec2),
    Jump,
}

/// FIFO drained once per frame by the active game
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    /// Bound on buffered events; a stalled tab drops the oldest
    pub const MAX_PENDING: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        if self.events.len() >= Self::MAX_PENDING {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
