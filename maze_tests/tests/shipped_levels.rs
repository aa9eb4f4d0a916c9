use std::path::PathBuf;

use maze_app::MazeApp;
use maze_core::{TickOutcome, World};
use maze_shared::{
    config::{MazeConfig, MovementConfig},
    level::{ItemDesc, LevelSource},
    math::Vec3,
};
use maze_tests::{init_tracing, settle, shipped_levels, spawn, DT};

fn level_ids() -> Vec<String> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../levels");
    let mut ids: Vec<String> = std::fs::read_dir(&dir)
        .expect("levels dir")
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.extension()? == "json").then(|| path.file_stem()?.to_str().map(str::to_string))?
        })
        .collect();
    ids.sort();
    ids
}

#[test]
fn shipped_levels_load_and_are_well_formed() -> anyhow::Result<()> {
    init_tracing();
    let levels = shipped_levels();
    let ids = level_ids();
    assert!(ids.iter().any(|id| id == "start"));

    let cfg = MovementConfig::default();
    for id in &ids {
        let desc = levels.load(id)?;
        let world = World::from_level(id, &desc, &cfg);

        for (i, solid) in world.solids().iter().enumerate() {
            assert!(solid.winding() < 0.0, "{id}: solid {i} is wound inside out");
        }
        assert!(
            world.solids().iter().all(|s| !s.contains(world.start_pos(), cfg.bump)),
            "{id}: start is inside a solid"
        );

        let targets = desc.items.iter().filter_map(|item| match item {
            ItemDesc::Portal { to, .. } | ItemDesc::LockedDoor { to, .. } => to.clone(),
            _ => None,
        });
        for target in targets.chain(desc.next_level.clone()) {
            assert!(ids.contains(&target), "{id}: leads to unknown level {target}");
        }
    }
    Ok(())
}

#[test]
fn player_settles_at_every_start() -> anyhow::Result<()> {
    init_tracing();
    let levels = shipped_levels();
    for id in level_ids() {
        let mut world = World::from_level(&id, &levels.load(&id)?, &MovementConfig::default());
        let mut player = spawn(&world);
        assert!(
            settle(&mut world, &mut player, 120).is_some(),
            "{id}: player never landed"
        );
    }
    Ok(())
}

#[test]
fn key_level_is_won_on_the_white_floor() -> anyhow::Result<()> {
    init_tracing();
    let desc = shipped_levels().load("key")?;
    let mut world = World::from_level("key", &desc, &MovementConfig::default());
    let winning: Vec<&str> = world
        .solids()
        .iter()
        .filter(|s| s.win)
        .map(|s| s.material.as_str())
        .collect();
    assert_eq!(winning, vec!["White"]);

    let mut player = spawn(&world);
    player.position = Vec3::new(8.0, 8.5, 6.0);
    let outcome = (0..120)
        .map(|_| player.physics(&mut world, DT))
        .find(|o| !o.is_continue());
    assert_eq!(outcome, Some(TickOutcome::Victory));
    Ok(())
}

#[test]
fn app_runs_shipped_start_level() -> anyhow::Result<()> {
    init_tracing();
    let mut app = MazeApp::new(MazeConfig::default(), Box::new(shipped_levels()))?;
    for i in 0..240 {
        app.frame(f64::from(i) * DT)?;
    }
    assert_eq!(app.world().level(), "start");
    assert!(app.player().is_grounded());
    assert_eq!(app.player().hearts, 3);
    Ok(())
}
