//! Shared fixtures for the integration tests.

use std::path::PathBuf;

use maze_core::{Player, TickOutcome, World};
use maze_shared::{
    config::MovementConfig,
    level::{FloorDesc, ItemDesc, LevelDesc, LevelDir, WallDesc},
    math::Vec3,
};

/// Tick length used throughout the tests.
pub const DT: f64 = 1.0 / 60.0;

/// Routes `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// The levels shipped with the workspace.
pub fn shipped_levels() -> LevelDir {
    LevelDir::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../levels"))
}

pub fn floor(pos: Vec3, x: f64, y: f64, colour: &str) -> FloorDesc {
    FloorDesc {
        pos,
        edges: [Vec3::new(x, 0.0, 0.0), Vec3::new(0.0, y, 0.0)],
        colour: colour.to_string(),
        win: false,
    }
}

/// A wall occupying `x0..x0 + 0.5` across the whole test floor.
pub fn wall_across_x(x0: f64) -> WallDesc {
    WallDesc {
        pos: Vec3::new(x0, -5.0, 0.0),
        edges: [
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
        ],
        colour: "Blue".to_string(),
    }
}

/// A 10x10 floor at z = 0 centred on the origin, start at (0, 0, 2).
pub fn flat_level(items: Vec<ItemDesc>) -> LevelDesc {
    LevelDesc {
        start: Vec3::new(0.0, 0.0, 2.0),
        start_angle: [0.0, 0.0],
        doom_z: -20.0,
        next_level: None,
        floors: vec![floor(Vec3::new(-5.0, -5.0, 0.0), 10.0, 10.0, "Red")],
        walls: vec![],
        items,
        colours: Default::default(),
    }
}

/// A fresh player at the world's start.
pub fn spawn(world: &World) -> Player {
    let mut p = Player::new(MovementConfig::default());
    p.reset(world.start_pos());
    p
}

/// Ticks until the player stands on something, up to `limit` ticks.
/// Returns the number of ticks taken.
pub fn settle(world: &mut World, player: &mut Player, limit: usize) -> Option<usize> {
    (1..=limit).find(|_| {
        player.physics(world, DT);
        player.is_grounded()
    })
}

/// Ticks with `walk` held until something other than `Continue` happens.
pub fn walk_until_outcome(
    world: &mut World,
    player: &mut Player,
    walk: Vec3,
    limit: usize,
) -> Option<TickOutcome> {
    (0..limit).find_map(|_| {
        player.walk(walk);
        let outcome = player.physics(world, DT);
        (!outcome.is_continue()).then_some(outcome)
    })
}
