//! Scene configuration: sizes, stage durations and physics tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::layout::DESIGN_WIDTH;

/// Error type for loading and validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Durations of every stage of the draw, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTimings {
    /// Delay between scene start and the initial kick.
    pub impulse_delay: f32,
    /// Time over which ball restitution decays from 1 to 0.
    pub box_mix: f32,
    /// Lock icon rotation when the door opens.
    pub lock_rotate: f32,
    /// Result ball rising to the centre.
    pub move_ball: f32,
    /// Full shake (two wobble cycles).
    pub shake: f32,
    /// Cap swinging open.
    pub open_ball: f32,
    /// Coin growth and shell fade.
    pub move_coin: f32,
    /// One half of a star twinkle (fade out, then fade in).
    pub star_twinkle: f32,
    /// Delay between consecutive stars starting to twinkle.
    pub star_stagger: f32,
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            impulse_delay: 2.0,
            box_mix: 2.0,
            lock_rotate: 1.0,
            move_ball: 1.0,
            shake: 1.0,
            open_ball: 1.0,
            move_coin: 1.0,
            star_twinkle: 1.0,
            star_stagger: 0.5,
        }
    }
}

/// Physics tuning for the ball box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Gravity in scene pixels/s² (positive is down).
    pub gravity: f32,
    /// Kick velocity as a multiple of `(scene width, -box height)` per second.
    pub impulse_scale: f32,
    /// Restitution of the box walls.
    pub wall_restitution: f32,
    /// Restitution of the exit pipe walls.
    pub pipe_restitution: f32,
    pub ball_friction: f32,
    pub ball_damping: f32,
    /// Seconds after the door opens before a stalled machine gets nudged.
    pub exit_timeout: f32,
    /// Velocity applied to the ball nearest the hole when nudging.
    pub nudge_speed: f32,
    /// Maximum per-frame movement (pixels) still counted as idle.
    pub idle_epsilon: f32,
    /// Consecutive idle frames required before the reveal starts.
    pub idle_frames: u32,
    /// Upper bound on the settle wait, in seconds.
    pub settle_timeout: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 1470.0,
            impulse_scale: 1.5,
            wall_restitution: 1.0,
            pipe_restitution: 0.1,
            ball_friction: 0.2,
            ball_damping: 0.1,
            exit_timeout: 4.0,
            nudge_speed: 600.0,
            idle_epsilon: 0.05,
            idle_frames: 6,
            settle_timeout: 3.0,
        }
    }
}

/// Complete configuration of one lottery scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene size in pixels `[width, height]`.
    pub scene_size: [f32; 2],
    /// Ball width in design units (800-wide reference layout).
    pub ball_width: f32,
    pub ball_count: u32,
    /// Number of ball textures; each ball picks one of `1..=ball_variants`.
    pub ball_variants: u32,
    /// Coin scale factor at the end of the coin reveal.
    pub coin_growth: f32,
    /// Value shown on the presented reward, indexed by `variant - 1`.
    pub coin_values: Vec<u32>,
    pub rng_seed: u64,
    pub timings: StageTimings,
    pub physics: PhysicsTuning,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_size: [800.0, 1261.0],
            ball_width: 120.0,
            ball_count: 10,
            ball_variants: 4,
            coin_growth: 1.8,
            coin_values: vec![100, 200, 500, 1000],
            rng_seed: 12345,
            timings: StageTimings::default(),
            physics: PhysicsTuning::default(),
        }
    }
}

impl SceneConfig {
    /// Loads a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("[config] loading scene config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The bundled default scene.
    /// Loaded from scenes/default.json at compile time.
    pub fn default_scene() -> Self {
        const DEFAULT_SCENE_JSON: &str = include_str!("../scenes/default.json");
        Self::from_json(DEFAULT_SCENE_JSON).expect("Failed to parse default scene JSON")
    }

    /// Returns a copy with a different RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Coin value for a ball variant (1-based). Falls back to the last value.
    pub fn coin_value(&self, variant: u32) -> u32 {
        let index = variant.saturating_sub(1) as usize;
        self.coin_values
            .get(index)
            .or_else(|| self.coin_values.last())
            .copied()
            .unwrap_or(0)
    }

    /// Checks that the configuration describes a playable scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [width, height] = self.scene_size;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "scene size must be positive, got {width}x{height}"
            )));
        }
        if !(self.ball_width > 0.0 && self.ball_width.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "ball_width must be positive, got {}",
                self.ball_width
            )));
        }
        if self.ball_count == 0 {
            return Err(ConfigError::Invalid("ball_count must be at least 1".into()));
        }
        if self.ball_variants == 0 {
            return Err(ConfigError::Invalid(
                "ball_variants must be at least 1".into(),
            ));
        }
        if !(self.coin_growth > 0.0 && self.coin_growth.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "coin_growth must be positive, got {}",
                self.coin_growth
            )));
        }
        // ball_width is in design units, so the spawn band is empty once two
        // balls span the design width.
        if self.ball_width * 2.0 >= DESIGN_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "ball_width {} leaves no spawn room in the box",
                self.ball_width
            )));
        }

        let t = &self.timings;
        let durations = [
            ("impulse_delay", t.impulse_delay, true),
            ("box_mix", t.box_mix, false),
            ("lock_rotate", t.lock_rotate, true),
            ("move_ball", t.move_ball, false),
            ("shake", t.shake, false),
            ("open_ball", t.open_ball, false),
            ("move_coin", t.move_coin, false),
            ("star_twinkle", t.star_twinkle, false),
            ("star_stagger", t.star_stagger, true),
        ];
        for (name, value, zero_ok) in durations {
            if value < 0.0 || (!zero_ok && value == 0.0) || !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "timing {name} must be {}, got {value}",
                    if zero_ok { "non-negative" } else { "positive" }
                )));
            }
        }

        let p = &self.physics;
        if p.idle_frames == 0 {
            return Err(ConfigError::Invalid("idle_frames must be at least 1".into()));
        }
        if !p.gravity.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {}",
                p.gravity
            )));
        }
        let tunables = [
            ("impulse_scale", p.impulse_scale, true),
            ("wall_restitution", p.wall_restitution, true),
            ("pipe_restitution", p.pipe_restitution, true),
            ("ball_friction", p.ball_friction, true),
            ("ball_damping", p.ball_damping, true),
            ("exit_timeout", p.exit_timeout, false),
            ("nudge_speed", p.nudge_speed, true),
            ("idle_epsilon", p.idle_epsilon, true),
            ("settle_timeout", p.settle_timeout, false),
        ];
        for (name, value, zero_ok) in tunables {
            if value < 0.0 || (!zero_ok && value == 0.0) || !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "physics {name} must be {}, got {value}",
                    if zero_ok { "non-negative" } else { "positive" }
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_matches_default() {
        let bundled = SceneConfig::default_scene();
        assert_eq!(bundled, SceneConfig::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(r#"{ "ball_count": 3, "timings": { "shake": 0.5 } }"#)
            .unwrap();
        assert_eq!(config.ball_count, 3);
        assert_eq!(config.timings.shake, 0.5);
        assert_eq!(config.timings.move_ball, 1.0);
        assert_eq!(config.scene_size, [800.0, 1261.0]);
    }

    #[test]
    fn test_rejects_zero_balls() {
        let err = SceneConfig::from_json(r#"{ "ball_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_negative_duration() {
        let mut config = SceneConfig::default();
        config.timings.open_ball = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_ball_too_wide_for_large_scene() {
        let mut config = SceneConfig::default();
        config.scene_size = [2000.0, 3000.0];
        config.ball_width = 500.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.ball_width = 300.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut config = SceneConfig::default();
        config.ball_width = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.coin_growth = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.physics.nudge_speed = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.physics.gravity = f32::NEG_INFINITY;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.scene_size = [f32::INFINITY, 1261.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SceneConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_coin_value_fallback() {
        let config = SceneConfig::default();
        assert_eq!(config.coin_value(1), 100);
        assert_eq!(config.coin_value(4), 1000);
        assert_eq!(config.coin_value(9), 1000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
