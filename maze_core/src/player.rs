//! The player character.
//!
//! A single point body with a collision margin (`bump`). Each tick runs,
//! strictly in this order:
//!
//! 1. floor detection and gravity ([`Player::find_floor`]); landing on a
//!    winning floor ends the game here
//! 2. walk or jump velocity, only when grounded ([`Player::walk_velocity`])
//! 3. slide resolution against solids ([`Player::check_collisions`])
//! 4. item contact
//! 5. hazard damage
//! 6. the doom check
//!
//! Later steps read what earlier ones wrote. Any step that produces a
//! non-`Continue` [`TickOutcome`] ends the tick there.

use maze_shared::{
    config::MovementConfig,
    math::{project_onto_plane, Plane, Quat, Vec3},
};
use tracing::{debug, info};

use crate::{
    outcome::TickOutcome,
    world::{Collision, World},
};

/// Extra clearance left between the player's margin and a face it rests on,
/// so resting on a floor never counts as being inside it.
pub const CONTACT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct Player {
    cfg: MovementConfig,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Desired walk direction in player space, accumulated from input and
    /// cleared at the end of every tick.
    pub walking: Vec3,
    /// Written by the camera. Only yaw, never pitch.
    pub facing: Quat,
    pub falling: bool,
    pub jumping: bool,
    pub hearts: u32,
    pub have_key: bool,
    /// Set by hazards, consumed by the damage check.
    pub damage: bool,
    damage_cooldown: f64,
}

impl Player {
    pub fn new(cfg: MovementConfig) -> Self {
        let hearts = cfg.max_hearts;
        Self {
            cfg,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            walking: Vec3::ZERO,
            facing: Quat::IDENTITY,
            falling: true,
            jumping: false,
            hearts,
            have_key: false,
            damage: false,
            damage_cooldown: 0.0,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.cfg
    }

    /// Collision margin around the player's centre.
    pub fn bump(&self) -> f64 {
        self.cfg.bump
    }

    pub fn is_grounded(&self) -> bool {
        !self.falling
    }

    /// Full reset for a new game: back to `start` with full hearts.
    pub fn reset(&mut self, start: Vec3) {
        self.respawn(start);
        self.hearts = self.cfg.max_hearts;
        self.facing = Quat::IDENTITY;
    }

    /// Back to `start` after a fall, keeping the remaining hearts.
    pub fn respawn(&mut self, start: Vec3) {
        self.position = start;
        self.velocity = Vec3::ZERO;
        self.walking = Vec3::ZERO;
        self.falling = true;
        self.jumping = false;
        self.have_key = false;
        self.damage = false;
        self.damage_cooldown = 0.0;
    }

    /// Adds to this tick's walk intent. Only moves us if we're on the ground.
    pub fn walk(&mut self, direction: Vec3) {
        self.walking += direction * self.cfg.walk_speed;
    }

    /// Asks for a jump. Taken the next time we're on the ground.
    pub fn jump(&mut self, to: bool) {
        self.jumping = to;
    }

    /// Flags hazard contact for this tick.
    pub fn hurt(&mut self) {
        self.damage = true;
    }

    /// Restores one heart. Returns false if already at full health.
    pub fn heal(&mut self) -> bool {
        if self.hearts >= self.cfg.max_hearts {
            return false;
        }
        self.hearts += 1;
        true
    }

    /// Visual stretch along each axis, growing with speed.
    pub fn squash_scale(&self) -> Vec3 {
        let v = self.velocity.abs();
        Vec3::new(v.x * 0.015 + 1.0, v.y * 0.015 + 1.0, v.z * 0.0075 + 1.0)
    }

    /// Runs one tick of player physics.
    pub fn physics(&mut self, world: &mut World, dt: f64) -> TickOutcome {
        match self.find_floor(world, dt) {
            Some(floor) if world.is_winning(floor.solid) => {
                info!(solid = floor.solid, "Reached the winning floor");
                return TickOutcome::Victory;
            }
            Some(floor) => {
                let vel = self.walk_velocity(floor.plane.normal);
                self.check_collisions(world, vel, dt);
            }
            None => self.walking = Vec3::ZERO,
        }

        if let Some(outcome) = self.touch_items(world) {
            return outcome;
        }
        if let Some(outcome) = self.check_damage(dt) {
            return outcome;
        }
        self.check_doom(world)
    }

    /// Applies gravity and looks for something to stand on.
    ///
    /// Returns what we landed on, or `None` if we are in the air (in which
    /// case we have already moved).
    pub fn find_floor(&mut self, world: &World, dt: f64) -> Option<Collision> {
        let fall = Vec3::new(0.0, 0.0, -self.cfg.fall_accel * dt);
        // Starting a fall drops whatever horizontal speed we had.
        let vel = if self.falling { self.velocity + fall } else { fall };
        let candidate = self.position + vel * dt;

        match world.collision(self.position, candidate, self.bump()) {
            Some(hit) => {
                if self.falling {
                    self.velocity = Vec3::ZERO;
                }
                self.falling = false;
                self.position = self.clear_of(candidate, &hit.plane);
                Some(hit)
            }
            None => {
                self.position = candidate;
                self.velocity = vel;
                self.falling = true;
                None
            }
        }
    }

    /// Turns this tick's walk intent into a velocity. Consumes the intent.
    pub fn walk_velocity(&mut self, floor_normal: Vec3) -> Vec3 {
        let dir = self.facing * std::mem::take(&mut self.walking);

        if self.jumping {
            self.jumping = false;
            self.falling = true;
            self.velocity = Vec3::new(dir.x, dir.y, self.cfg.jump_speed);
            return self.velocity;
        }

        let climbable = dir.normalize_or_zero().dot(floor_normal) >= self.cfg.max_climb_dot;
        self.velocity = if dir != Vec3::ZERO && climbable {
            project_onto_plane(floor_normal, dir)
        } else {
            Vec3::ZERO
        };
        self.velocity
    }

    /// Moves by `vel * dt`, sliding once along the first face in the way.
    ///
    /// If the slide is blocked too we stay put and stop.
    pub fn check_collisions(&mut self, world: &World, vel: Vec3, dt: f64) {
        let bump = self.bump();
        let candidate = self.position + vel * dt;

        let Some(hit) = world.collision(self.position, candidate, bump) else {
            self.position = candidate;
            self.velocity = vel;
            return;
        };

        if hit.embedded {
            self.position = self.clear_of(self.position, &hit.plane);
        }

        let slide = project_onto_plane(hit.plane.normal, vel);
        let candidate = self.position + slide * dt;
        if world.collision(self.position, candidate, bump).is_some() {
            debug!(solid = hit.solid, "Stuck");
            self.velocity = Vec3::ZERO;
            return;
        }

        self.position = candidate;
        self.velocity = slide;
    }

    /// `point` moved along the plane normal to rest just outside our margin.
    fn clear_of(&self, point: Vec3, plane: &Plane) -> Vec3 {
        let target = self.bump() + CONTACT_EPSILON;
        point + plane.normal * (target - plane.distance(point))
    }

    fn touch_items(&mut self, world: &mut World) -> Option<TickOutcome> {
        let next_level = world.next_level().map(str::to_owned);
        for i in world.colliding_items(self.position, self.bump()) {
            let item = &mut world.items[i];
            if let Some(outcome) = item.activate(self, next_level.as_deref()) {
                debug!(item = item.type_name(), ?outcome, "Item activated");
                return Some(outcome);
            }
        }
        None
    }

    /// Loses a heart for hazard contact, at most once per damage interval.
    fn check_damage(&mut self, dt: f64) -> Option<TickOutcome> {
        self.damage_cooldown = (self.damage_cooldown - dt).max(0.0);
        if !std::mem::take(&mut self.damage) || self.damage_cooldown > 0.0 {
            return None;
        }

        self.damage_cooldown = self.cfg.damage_interval;
        self.hearts = self.hearts.saturating_sub(1);
        info!(hearts = self.hearts, "Player hurt");
        (self.hearts == 0).then_some(TickOutcome::Death)
    }

    fn check_doom(&mut self, world: &World) -> TickOutcome {
        if !world.doomed(self.position) {
            return TickOutcome::Continue;
        }

        self.hearts = self.hearts.saturating_sub(1);
        if self.hearts == 0 {
            info!(z = self.position.z, "Player died");
            return TickOutcome::Death;
        }

        info!(hearts = self.hearts, z = self.position.z, "Fell out of the world");
        self.respawn(world.start_pos());
        TickOutcome::Respawn
    }
}
