//! Items placed in a level.
//!
//! Items are a closed set. Each one can be tested for contact with the
//! player, activated on contact, and asked for a model transform to draw.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};

use maze_shared::{
    level::ItemDesc,
    math::{Mat4, Vec3},
};
use tracing::{debug, info};

use crate::{outcome::TickOutcome, player::Player};

/// Contact radius of an item.
pub const ITEM_BUMP: f64 = 0.5;

/// Hazard box of a spike patch in its own space, before scaling by `size`:
/// a unit square on local XY, pointing up local Z.
const SPIKE_HALF_WIDTH: f64 = 0.5;
const SPIKE_HEIGHT: f64 = 0.5;

/// Spin rate of floating pickups, radians per second.
const PICKUP_SPIN: f64 = 0.8 * PI;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Key { visible: bool },
    Portal { to: Option<String>, angle: f64 },
    LockedDoor { to: Option<String>, angle: f64, unlocked: bool },
    Spike { angle: f64, size: f64 },
    Heart { visible: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub pos: Vec3,
    pub bump: f64,
    pub kind: ItemKind,
}

impl Item {
    /// Builds an item from its level record. Angles arrive in degrees.
    pub fn from_desc(desc: &ItemDesc) -> Self {
        let kind = match desc {
            ItemDesc::Key { .. } => ItemKind::Key { visible: true },
            ItemDesc::Portal { to, angle, .. } => ItemKind::Portal {
                to: to.clone(),
                angle: angle.to_radians(),
            },
            ItemDesc::LockedDoor { to, angle, .. } => ItemKind::LockedDoor {
                to: to.clone(),
                angle: angle.to_radians(),
                unlocked: false,
            },
            ItemDesc::Spike { angle, size, .. } => ItemKind::Spike {
                angle: angle.to_radians(),
                size: *size,
            },
            ItemDesc::Heart { .. } => ItemKind::Heart { visible: true },
        };
        Self {
            pos: desc.pos(),
            bump: ITEM_BUMP,
            kind,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Key { .. } => "Key",
            ItemKind::Portal { .. } => "Portal",
            ItemKind::LockedDoor { .. } => "LockedDoor",
            ItemKind::Spike { .. } => "Spike",
            ItemKind::Heart { .. } => "Heart",
        }
    }

    pub fn visible(&self) -> bool {
        match self.kind {
            ItemKind::Key { visible } | ItemKind::Heart { visible } => visible,
            _ => true,
        }
    }

    /// True if a player at `pos` with margin `bump` touches this item.
    pub fn collide(&self, pos: Vec3, bump: f64) -> bool {
        match self.kind {
            ItemKind::Spike { size, .. } => self.spike_contact(pos, bump, size),
            _ if !self.visible() => false,
            _ => self.pos.distance(pos) < bump + self.bump,
        }
    }

    /// Oriented box test in the spike's own space.
    fn spike_contact(&self, pos: Vec3, bump: f64, size: f64) -> bool {
        let local = self.placement().inverse().transform_point3(pos);
        let b = bump / size;
        local.x.abs() <= SPIKE_HALF_WIDTH + b
            && local.y.abs() <= SPIKE_HALF_WIDTH + b
            && local.z >= -b
            && local.z <= SPIKE_HEIGHT + b
    }

    /// Placement transform: translate, turn about Z, scale.
    pub fn placement(&self) -> Mat4 {
        let (angle, scale) = match self.kind {
            ItemKind::Portal { angle, .. } | ItemKind::LockedDoor { angle, .. } => (angle, 1.0),
            ItemKind::Spike { angle, size } => (angle, size),
            ItemKind::Key { .. } | ItemKind::Heart { .. } => (0.0, 1.0),
        };
        Mat4::from_translation(self.pos)
            * Mat4::from_rotation_z(angle)
            * Mat4::from_scale(Vec3::splat(scale))
    }

    /// Acts on the player. Returns an outcome when the tick must stop.
    ///
    /// `next_level` is where portals without a destination lead.
    pub fn activate(&mut self, player: &mut Player, next_level: Option<&str>) -> Option<TickOutcome> {
        match &mut self.kind {
            ItemKind::Key { visible } => {
                if *visible {
                    debug!(pos = ?self.pos, "Picked up key");
                    player.have_key = true;
                    *visible = false;
                }
                None
            }
            ItemKind::Portal { to, .. } => Some(portal_outcome(to.as_deref(), next_level)),
            ItemKind::LockedDoor { to, unlocked, .. } => {
                if !*unlocked && player.have_key {
                    info!(pos = ?self.pos, "Door unlocked");
                    player.have_key = false;
                    *unlocked = true;
                }
                unlocked.then(|| portal_outcome(to.as_deref(), next_level))
            }
            ItemKind::Spike { .. } => {
                player.hurt();
                None
            }
            ItemKind::Heart { visible } => {
                if *visible && player.heal() {
                    debug!(hearts = player.hearts, "Picked up heart");
                    *visible = false;
                }
                None
            }
        }
    }

    /// Model transform for drawing, or `None` if the item is hidden.
    pub fn model_matrix(&self, now: f64) -> Option<Mat4> {
        let spin = Mat4::from_rotation_z(PICKUP_SPIN * now);
        let m = match self.kind {
            ItemKind::Key { visible: false } | ItemKind::Heart { visible: false } => return None,
            ItemKind::Key { .. } => {
                Mat4::from_translation(self.pos)
                    * Mat4::from_scale(Vec3::splat(0.2))
                    * spin
                    * Mat4::from_rotation_y(FRAC_PI_3)
            }
            ItemKind::Heart { .. } => {
                Mat4::from_translation(self.pos)
                    * Mat4::from_scale(Vec3::splat(0.2))
                    * spin
                    * Mat4::from_rotation_x(FRAC_PI_2)
            }
            ItemKind::Portal { .. } | ItemKind::LockedDoor { .. } => {
                self.placement() * Mat4::from_scale(Vec3::splat(0.8))
            }
            ItemKind::Spike { .. } => self.placement(),
        };
        Some(m)
    }

    /// Puts the item back the way the level file left it.
    pub fn reset(&mut self) {
        match &mut self.kind {
            ItemKind::Key { visible } | ItemKind::Heart { visible } => *visible = true,
            ItemKind::LockedDoor { unlocked, .. } => *unlocked = false,
            ItemKind::Portal { .. } | ItemKind::Spike { .. } => {}
        }
    }
}

fn portal_outcome(to: Option<&str>, next_level: Option<&str>) -> TickOutcome {
    match to.filter(|s| !s.is_empty()).or(next_level) {
        Some(id) => TickOutcome::LevelChange(id.to_string()),
        None => TickOutcome::Victory,
    }
}
