//! The world: the currently loaded level.
//!
//! Owns the collision solids and items of one level. Loading a level
//! rebuilds everything; nothing from the previous level survives.

use anyhow::Context;
use maze_shared::{
    config::MovementConfig,
    geometry::ConvexSolid,
    level::{LevelDesc, LevelSource},
    math::{angles_to_radians, Plane, Vec3},
};
use tracing::info;

use crate::items::Item;

/// A solid the mover ended up inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Index into [`World::solids`].
    pub solid: usize,
    /// The face crossed this step.
    pub plane: Plane,
    /// The start point was already inside the solid; `plane` is then the
    /// face nearest to it, the one to push out through.
    pub embedded: bool,
}

#[derive(Debug, Clone)]
pub struct World {
    level: String,
    next_level: Option<String>,
    solids: Vec<ConvexSolid>,
    pub items: Vec<Item>,
    start: Vec3,
    start_angle: (f64, f64),
    doom_z: f64,
}

impl World {
    /// Builds a world from a level description.
    ///
    /// Floors come first, then walls, each in file order; collision
    /// queries report the first matching solid in that order.
    pub fn from_level(id: &str, desc: &LevelDesc, movement: &MovementConfig) -> Self {
        let floors = desc.floors.iter().map(|f| {
            ConvexSolid::floor(
                f.colour.clone(),
                f.pos,
                f.edges[0],
                f.edges[1],
                movement.floor_thickness,
            )
            .with_win(f.win)
        });
        let walls = desc.walls.iter().map(|w| {
            ConvexSolid::wall(w.colour.clone(), w.pos, w.edges[0], w.edges[1], w.edges[2])
        });

        Self {
            level: id.to_string(),
            next_level: desc.next_level.clone(),
            solids: floors.chain(walls).collect(),
            items: desc.items.iter().map(Item::from_desc).collect(),
            start: desc.start,
            start_angle: angles_to_radians(desc.start_angle),
            doom_z: desc.doom_z,
        }
    }

    /// Loads `id` from `levels` and replaces this world with it.
    ///
    /// On error the current world is left untouched.
    pub fn load_level(
        &mut self,
        levels: &dyn LevelSource,
        id: &str,
        movement: &MovementConfig,
    ) -> anyhow::Result<()> {
        let desc = levels.load(id).with_context(|| format!("load level {id}"))?;
        *self = Self::from_level(id, &desc, movement);

        info!(
            level = %id,
            solids = self.solids.len(),
            items = self.items.len(),
            doom_z = self.doom_z,
            "Level loaded"
        );
        Ok(())
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    /// The level the file names as its successor, if any.
    pub fn next_level(&self) -> Option<&str> {
        self.next_level.as_deref()
    }

    pub fn solids(&self) -> &[ConvexSolid] {
        &self.solids
    }

    pub fn start_pos(&self) -> Vec3 {
        self.start
    }

    /// `(yaw, pitch)` in radians.
    pub fn start_angle(&self) -> (f64, f64) {
        self.start_angle
    }

    pub fn doom_z(&self) -> f64 {
        self.doom_z
    }

    /// We have just moved from `old` to `new` with the given margin.
    ///
    /// Returns the first solid containing `new` and the face of it that
    /// `old` was outside of.
    pub fn collision(&self, old: Vec3, new: Vec3, margin: f64) -> Option<Collision> {
        let (solid, hit) = self
            .solids
            .iter()
            .enumerate()
            .find(|(_, s)| s.contains(new, margin))?;

        if let Some(plane) = hit.planes.iter().find(|pl| pl.distance(old) > margin) {
            return Some(Collision {
                solid,
                plane: *plane,
                embedded: false,
            });
        }

        // Already inside at the start of the step: report the shallowest face.
        let plane = hit
            .planes
            .iter()
            .copied()
            .max_by(|a, b| a.distance(old).total_cmp(&b.distance(old)))?;
        Some(Collision {
            solid,
            plane,
            embedded: true,
        })
    }

    /// Indices of the items a player at `pos` touches, in level order.
    pub fn colliding_items(&self, pos: Vec3, bump: f64) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.collide(pos, bump))
            .map(|(i, _)| i)
            .collect()
    }

    /// True if landing on `solid` wins the game.
    pub fn is_winning(&self, solid: usize) -> bool {
        self.solids.get(solid).is_some_and(|s| s.win)
    }

    /// True if `p` has fallen out of the world.
    pub fn doomed(&self, p: Vec3) -> bool {
        p.z < self.doom_z
    }

    /// Restores picked-up items and relocks doors.
    pub fn reset_items(&mut self) {
        for item in &mut self.items {
            item.reset();
        }
    }
}
