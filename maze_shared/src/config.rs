//! Configuration system.
//!
//! Loads game configuration from JSON strings/files. Every field has a
//! default, so a config file only needs the values it changes.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geometry::FLOOR_THICKNESS;

/// Player movement tuning.
///
/// The speeds are deliberately unrealistic: a lower jump speed barely
/// leaves the ground, and lower gravity leaves the player hanging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    /// Walk speed, m/s.
    pub walk_speed: f64,
    /// Initial upward speed of a jump, m/s.
    pub jump_speed: f64,
    /// Downward acceleration while falling, m/s².
    pub fall_accel: f64,
    /// Collision margin around the player's centre. Must be > 0.
    pub bump: f64,
    /// Hearts after a full reset; hearts never exceed this.
    pub max_hearts: u32,
    /// Minimum seconds between two hazard hits.
    pub damage_interval: f64,
    /// Downward thickness of floor slabs.
    pub floor_thickness: f64,
    /// Walking is blocked when `dot(direction, floor_normal)` falls below this.
    pub max_climb_dot: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            jump_speed: 8.0,
            fall_accel: 16.0,
            bump: 0.49,
            max_hearts: 3,
            damage_interval: 1.0,
            floor_thickness: FLOOR_THICKNESS,
            max_climb_dot: -0.5,
        }
    }
}

/// Camera tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Pan speed per unit of pan input, degrees/second.
    pub pan_speed: f64,
    /// Distance the view sits behind the player.
    pub offset: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 60.0,
            offset: 8.0,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MazeConfig {
    /// Fixed simulation tick rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Directory holding `<level>.json` files.
    #[serde(default = "default_levels_dir")]
    pub levels_dir: String,
    /// Level loaded at startup.
    #[serde(default = "default_start_level")]
    pub start_level: String,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

fn default_tick_hz() -> u32 {
    80
}

fn default_levels_dir() -> String {
    "levels".to_string()
}

fn default_start_level() -> String {
    "start".to_string()
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            levels_dir: default_levels_dir(),
            start_level: default_start_level(),
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl MazeConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_hz == 0 {
            anyhow::bail!("tick_hz must be positive");
        }
        if self.movement.bump <= 0.0 {
            anyhow::bail!("movement.bump must be positive, got {}", self.movement.bump);
        }
        if self.movement.max_hearts == 0 {
            anyhow::bail!("movement.max_hearts must be positive");
        }
        Ok(())
    }
}
