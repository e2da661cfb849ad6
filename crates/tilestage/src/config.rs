use serde::{Deserialize, Serialize};

use crate::api::types::Border;
use crate::components::vector::Vector2;
use crate::error::Result;
use crate::renderer::surface::Color;

/// Configuration for a world, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub title: String,
    /// World width in pixels.
    pub width: f64,
    /// World height in pixels.
    pub height: f64,
    /// Gravity in metres per second squared, Y pointing down. The solver
    /// receives it multiplied by `PIXELS_PER_METER`.
    pub gravity: Vector2,
    /// Linear damping applied to every body created by the world.
    pub air_resistance: f64,
    pub background: Color,
    /// Fixed timestep used by drivers (default: 1/60).
    pub fixed_dt: f64,
    /// Start with updates suspended.
    pub paused: bool,
    /// Outline used by `World::create_borders`; width 10 in black when unset.
    pub border: Option<Border>,
    /// Reseeds the default shape-name generator when the world is built.
    pub name_seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            title: "tilestage".to_string(),
            width: 800.0,
            height: 600.0,
            gravity: Vector2::ZERO,
            air_resistance: 0.0,
            background: Color::BLACK,
            fixed_dt: 1.0 / 60.0,
            paused: false,
            border: None,
            name_seed: None,
        }
    }
}

impl WorldConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_air_resistance(mut self, damping: f64) -> Self {
        self.air_resistance = damping;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_name_seed(mut self, seed: u64) -> Self {
        self.name_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let cfg = WorldConfig::default();
        assert_eq!(cfg.width, 800.0);
        assert_eq!(cfg.height, 600.0);
        assert_eq!(cfg.gravity, Vector2::ZERO);
        assert!((cfg.fixed_dt - 1.0 / 60.0).abs() < 1e-12);
        assert!(!cfg.paused);
        assert_eq!(cfg.name_seed, None);
    }

    #[test]
    fn name_seed_comes_from_json() {
        let cfg = WorldConfig::from_json(r#"{"name_seed": 42}"#).unwrap();
        assert_eq!(cfg.name_seed, Some(42));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = WorldConfig::from_json(r#"{"width": 320, "gravity": {"x": 0, "y": 10}}"#).unwrap();
        assert_eq!(cfg.width, 320.0);
        assert_eq!(cfg.height, 600.0);
        assert_eq!(cfg.gravity, Vector2::new(0.0, 10.0));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = WorldConfig::from_json(r#"{"width": "wide"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
