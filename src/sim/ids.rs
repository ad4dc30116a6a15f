//! Session-owned entity id allocation

use serde::{Deserialize, Serialize};

/// Monotonic id source, one per session; reset when a new round starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Id the next call will return
    pub fn peek(&self) -> u32 {
        self.next_id
    }

    pub fn reset(&mut self) {
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_monotonic_and_reset() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        ids.reset();
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn test_separate_sessions_independent() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id(), 1);
        assert_eq!(a.peek(), 3);
    }
}
