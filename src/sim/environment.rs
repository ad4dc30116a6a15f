//! Environment (map) keys selected by the host at session start

use serde::{Deserialize, Serialize};

/// Scenery/spawn-table selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Green meadow (the runner's "default" map)
    #[default]
    Meadow,
    Desert,
    Arctic,
    /// Dense city street with lamp posts
    Bangu,
    Haunted,
    Forest,
    Beach,
    /// Sketch-mode city backdrop
    City,
}

impl Environment {
    pub const ALL: [Environment; 8] = [
        Environment::Meadow,
        Environment::Desert,
        Environment::Arctic,
        Environment::Bangu,
        Environment::Haunted,
        Environment::Forest,
        Environment::Beach,
        Environment::City,
    ];

    /// Host-facing key
    pub fn key(&self) -> &'static str {
        match self {
            Environment::Meadow => "default",
            Environment::Desert => "desert",
            Environment::Arctic => "arctic",
            Environment::Bangu => "bangu",
            Environment::Haunted => "haunted",
            Environment::Forest => "forest",
            Environment::Beach => "beach",
            Environment::City => "city",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "default" | "meadow" => Some(Environment::Meadow),
            "desert" => Some(Environment::Desert),
            "arctic" => Some(Environment::Arctic),
            "bangu" => Some(Environment::Bangu),
            "haunted" => Some(Environment::Haunted),
            "forest" => Some(Environment::Forest),
            "beach" => Some(Environment::Beach),
            "city" => Some(Environment::City),
            _ => None,
        }
    }

    /// Unknown keys fall back to the meadow
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            log::warn!("Unknown environment '{}', using default", key);
            Environment::Meadow
        })
    }

    /// Phase offset for gap oscillation: `(first char code % 97) + 0.7`
    pub fn gap_phase(&self) -> f32 {
        let first = self.key().bytes().next().unwrap_or(b'd');
        (first % 97) as f32 + 0.7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for env in Environment::ALL {
            assert_eq!(Environment::from_key(env.key()), Some(env));
        }
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(Environment::from_key_or_default("moon"), Environment::Meadow);
    }

    #[test]
    fn test_gap_phase() {
        // 'd' = 100 -> 100 % 97 = 3
        assert!((Environment::Desert.gap_phase() - 3.7).abs() < 0.001);
        // 'a' = 97 -> 0
        assert!((Environment::Arctic.gap_phase() - 0.7).abs() < 0.001);
    }
}
