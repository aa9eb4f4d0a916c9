use maze_core::{player::CONTACT_EPSILON, TickOutcome, World};
use maze_shared::{config::MovementConfig, math::Vec3};
use maze_tests::{flat_level, init_tracing, settle, spawn, walk_until_outcome, wall_across_x, DT};

fn world_from(desc: &maze_shared::level::LevelDesc) -> World {
    World::from_level("test", desc, &MovementConfig::default())
}

/// Dropped from z = 2 onto a floor at z = 0, the player lands within the
/// free-fall time and then stays put.
#[test]
fn lands_on_floor_within_fall_time() {
    init_tracing();
    let cfg = MovementConfig::default();
    let mut world = world_from(&flat_level(vec![]));
    let mut player = spawn(&world);

    let limit = ((2.0 * 2.0 / cfg.fall_accel).sqrt() * 60.0).ceil() as usize;
    let ticks = settle(&mut world, &mut player, limit).expect("player never landed");
    assert!(ticks <= limit);
    assert!((player.position.z - cfg.bump).abs() < 1e-5);

    let rest = player.position;
    for _ in 0..300 {
        assert_eq!(player.physics(&mut world, DT), TickOutcome::Continue);
    }
    assert!((player.position - rest).length() < 1e-9);
    assert!(player.is_grounded());
}

#[test]
fn wall_stops_walking() {
    init_tracing();
    let mut desc = flat_level(vec![]);
    desc.walls.push(wall_across_x(3.0));
    let mut world = world_from(&desc);
    let mut player = spawn(&world);
    settle(&mut world, &mut player, 100).expect("player never landed");

    for _ in 0..120 {
        player.walk(Vec3::X);
        assert!(player.physics(&mut world, DT).is_continue());
        assert!(player.position.x <= 3.0 - player.bump());
    }
    let stop = 3.0 - player.bump() - CONTACT_EPSILON;
    assert!(player.position.x > stop - 0.2);
    assert!(player.is_grounded());
}

#[test]
fn walking_off_the_edge_costs_hearts_then_death() {
    init_tracing();
    let mut world = world_from(&flat_level(vec![]));
    let mut player = spawn(&world);

    let first = walk_until_outcome(&mut world, &mut player, Vec3::X, 1000);
    assert_eq!(first, Some(TickOutcome::Respawn));
    assert_eq!(player.hearts, 2);
    assert_eq!(player.position, world.start_pos());

    let second = walk_until_outcome(&mut world, &mut player, Vec3::NEG_Y, 1000);
    assert_eq!(second, Some(TickOutcome::Respawn));
    assert_eq!(player.hearts, 1);

    let last = walk_until_outcome(&mut world, &mut player, Vec3::X, 1000);
    assert_eq!(last, Some(TickOutcome::Death));
    assert_eq!(player.hearts, 0);
}

#[test]
fn turning_changes_walk_direction() {
    init_tracing();
    let mut world = world_from(&flat_level(vec![]));
    let mut player = spawn(&world);
    let mut camera = maze_core::Camera::new(&Default::default());
    settle(&mut world, &mut player, 100).expect("player never landed");

    // Quarter turn left: one and a half seconds at -60 deg/s.
    camera.pan(maze_shared::math::Vec2::new(-1.0, 0.0));
    for _ in 0..90 {
        camera.physics(DT, &mut player);
    }
    camera.pan(maze_shared::math::Vec2::new(1.0, 0.0));

    let start = player.position;
    for _ in 0..30 {
        player.walk(Vec3::X);
        player.physics(&mut world, DT);
        camera.physics(DT, &mut player);
    }
    let moved = player.position - start;
    assert!(moved.y > 1.0);
    assert!(moved.x.abs() < 1e-6);
}
