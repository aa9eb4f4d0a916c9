//! The camera.
//!
//! Follows the player at a fixed distance with its own yaw and pitch. The
//! camera owns the player's facing: walking is always relative to where the
//! camera looks, ignoring pitch.

use std::f64::consts::FRAC_PI_2;

use maze_shared::{
    config::CameraConfig,
    math::{clamp_pitch, wrap_angle, yaw_rotation, Mat4, Vec2, Vec3},
};

use crate::player::Player;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Radians, in [0, 2π).
    pub yaw: f64,
    /// Radians, in [-π/2, π/2].
    pub pitch: f64,
    /// Current pan rate in radians per second, `x` horizontal, `y` vertical.
    pub panning: Vec2,
    /// Distance behind the player.
    pub offset: f64,
    pan_speed: f64,
}

impl Camera {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            panning: Vec2::ZERO,
            offset: cfg.offset,
            pan_speed: cfg.pan_speed.to_radians(),
        }
    }

    /// Starts (or with a negated `v`, stops) panning.
    ///
    /// Calls add up, so holding two opposite keys cancels out. Positive `x`
    /// turns right, positive `y` looks up.
    pub fn pan(&mut self, v: Vec2) {
        self.panning += v * self.pan_speed;
    }

    /// Looks along `start_angle` (yaw, pitch in radians) and stops panning.
    pub fn reset(&mut self, start_angle: (f64, f64)) {
        let (yaw, pitch) = start_angle;
        self.yaw = wrap_angle(yaw);
        self.pitch = clamp_pitch(pitch);
        self.panning = Vec2::ZERO;
    }

    /// Integrates panning and hands the new heading to the player.
    pub fn physics(&mut self, dt: f64, player: &mut Player) {
        if self.panning != Vec2::ZERO {
            let delta = self.panning * dt;
            self.yaw = wrap_angle(self.yaw - delta.x);
            self.pitch = clamp_pitch(self.pitch + delta.y);
        }
        player.facing = yaw_rotation(self.yaw);
    }

    /// World to view transform for a camera looking at `target`.
    ///
    /// View space looks down -Z with +Y up; `target` lands `offset` units
    /// straight ahead.
    pub fn view_matrix(&self, target: Vec3) -> Mat4 {
        Mat4::from_rotation_z(FRAC_PI_2)
            * Mat4::from_rotation_y(FRAC_PI_2)
            * Mat4::from_translation(Vec3::new(self.offset, 0.0, 0.0))
            * Mat4::from_rotation_y(self.pitch)
            * Mat4::from_rotation_z(-self.yaw)
            * Mat4::from_translation(-target)
    }
}
