//! The application.
//!
//! `MazeApp` owns everything one game session needs and drives it:
//! - Runs one player tick and one camera tick per frame
//! - Acts on tick outcomes (respawn, level change, death, victory)
//! - Console commands and cvars (pause, tick rate, render toggles)
//! - Key events through [`KeyBindings`]
//! - Hands each frame to a [`RenderBackend`]

use anyhow::Context;
use maze_core::{Camera, Player, RenderBackend, RenderFlags, TickOutcome, World};
use maze_shared::{
    config::MazeConfig,
    console::{Console, CvarFlags, CvarValue},
    level::LevelSource,
    math::{Vec2, Vec3},
};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    input::{Command, InputState, KeyBindings},
};

/// Where the session is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    /// The last portal was taken.
    Won,
    /// Asked to quit.
    Quit,
}

pub struct MazeApp {
    pub cfg: MazeConfig,
    pub console: Console,
    pub bindings: KeyBindings,
    levels: Box<dyn LevelSource>,
    world: World,
    player: Player,
    camera: Camera,
    input: InputState,
    clock: Clock,
    state: AppState,
    tick: u64,
    deaths: u32,
}

impl MazeApp {
    /// Creates the app and loads `cfg.start_level` from `levels`.
    pub fn new(cfg: MazeConfig, levels: Box<dyn LevelSource>) -> anyhow::Result<Self> {
        cfg.validate().context("invalid config")?;

        let start = cfg.start_level.clone();
        let desc = levels
            .load(&start)
            .with_context(|| format!("load start level {start}"))?;
        let world = World::from_level(&start, &desc, &cfg.movement);

        let mut console = Console::new();
        Self::register_cvars(&mut console);

        let mut app = Self {
            player: Player::new(cfg.movement.clone()),
            camera: Camera::new(&cfg.camera),
            cfg,
            console,
            bindings: KeyBindings::default(),
            levels,
            world,
            input: InputState::default(),
            clock: Clock::new(),
            state: AppState::Running,
            tick: 0,
            deaths: 0,
        };
        app.restart_level();

        info!(
            level = %start,
            solids = app.world.solids().len(),
            items = app.world.items.len(),
            "Game started"
        );
        Ok(app)
    }

    fn register_cvars(console: &mut Console) {
        console.register_cvar("pause", CvarValue::Bool(false), "Stop the simulation", CvarFlags::PHYSICS);
        console.register_cvar("wireframe", CvarValue::Bool(false), "Draw solids as outlines", CvarFlags::RENDER);
        console.register_cvar("backface", CvarValue::Bool(false), "Draw back faces", CvarFlags::RENDER);
        console.register_cvar("miniview", CvarValue::Bool(false), "Show the overhead view", CvarFlags::RENDER);
        console.register_cvar("lowfps", CvarValue::Bool(false), "Run at half the tick rate", CvarFlags::PHYSICS);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn is_paused(&self) -> bool {
        self.console.cvar_bool("pause")
    }

    /// Ticks per second the loop should run at right now.
    pub fn tick_hz(&self) -> u32 {
        if self.console.cvar_bool("lowfps") {
            (self.cfg.tick_hz / 2).max(1)
        } else {
            self.cfg.tick_hz
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Loads a level and puts the player at its start.
    ///
    /// On error nothing changes.
    pub fn load_level(&mut self, id: &str) -> anyhow::Result<()> {
        self.world
            .load_level(self.levels.as_ref(), id, &self.cfg.movement)?;
        self.player.reset(self.world.start_pos());
        self.reset_camera();
        self.state = AppState::Running;
        Ok(())
    }

    /// Starts the current level over without reloading it.
    pub fn restart_level(&mut self) {
        self.world.reset_items();
        self.player.reset(self.world.start_pos());
        self.reset_camera();
        self.state = AppState::Running;
    }

    /// Points the camera along the level's start angle. Held pan keys keep
    /// panning.
    fn reset_camera(&mut self) {
        self.camera.reset(self.world.start_angle());
        self.camera.pan(self.input.panning());
    }

    /// Advances the clock to wall time `real` and runs a tick unless paused.
    pub fn frame(&mut self, real: f64) -> anyhow::Result<TickOutcome> {
        match (self.is_paused(), self.clock.is_paused()) {
            (true, false) => {
                self.clock.pause(real);
                info!(now = self.clock.now, "Paused");
            }
            (false, true) => {
                self.clock.resume(real);
                info!(offset = self.clock.offset(), "Resumed");
            }
            _ => {}
        }

        self.clock.update(real);
        if self.clock.is_paused() {
            return Ok(TickOutcome::Continue);
        }
        self.physics(self.clock.dt)
    }

    /// Runs one tick of `dt` seconds and handles its outcome.
    ///
    /// A level change to a level that fails to load is an error; the
    /// current level stays loaded and starts over.
    pub fn physics(&mut self, dt: f64) -> anyhow::Result<TickOutcome> {
        if self.state != AppState::Running {
            return Ok(TickOutcome::Continue);
        }

        self.player.walk(self.input.walking());
        let outcome = self.player.physics(&mut self.world, dt);
        if outcome.is_continue() {
            self.camera.physics(dt, &mut self.player);
        }
        self.tick += 1;

        self.handle_outcome(&outcome)?;
        Ok(outcome)
    }

    fn handle_outcome(&mut self, outcome: &TickOutcome) -> anyhow::Result<()> {
        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Respawn => {
                // The player has already moved itself back to the start.
                self.world.reset_items();
                self.reset_camera();
                info!(hearts = self.player.hearts, "Respawned");
            }
            TickOutcome::LevelChange(to) => {
                info!(from = %self.world.level(), to = %to, "Changing level");
                if let Err(e) = self.load_level(to) {
                    warn!(to = %to, error = %e, "Level change failed, restarting level");
                    self.restart_level();
                    return Err(e).with_context(|| format!("change level to {to}"));
                }
            }
            TickOutcome::Death => {
                self.deaths += 1;
                info!(level = %self.world.level(), deaths = self.deaths, "Player died, restarting level");
                self.restart_level();
            }
            TickOutcome::Victory => {
                info!(level = %self.world.level(), ticks = self.tick, "Victory");
                self.state = AppState::Won;
            }
        }
        Ok(())
    }

    /// Feeds a key event through the bindings.
    ///
    /// Repeated presses and releases of keys we never saw go down are
    /// dropped.
    pub fn handle_key(&mut self, key: &str, down: bool) {
        let fresh = if down {
            self.input.press(key)
        } else {
            self.input.release(key)
        };
        if !fresh {
            debug!(key, down, "Ignoring unmatched key event");
            return;
        }

        match self.bindings.lookup(key, down).cloned() {
            Some(cmd) => self.apply(cmd),
            None => debug!(key, down, "Unbound key"),
        }
    }

    /// Applies one input command.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Quit => {
                info!("Quit requested");
                self.state = AppState::Quit;
            }
            Command::Walk(dir) => self.input.add_walk(dir),
            Command::Pan(v) => {
                self.input.add_pan(v);
                self.camera.pan(v);
            }
            Command::Jump => self.player.jump(true),
            Command::Toggle(name) => match self.console.exec(&format!("toggle {name}")) {
                Ok(lines) => debug!(output = ?lines, "Toggled"),
                Err(e) => warn!(cvar = %name, error = %e, "Toggle failed"),
            },
        }
    }

    /// Current render switches, from the render cvars.
    pub fn render_flags(&self) -> RenderFlags {
        let mut flags = RenderFlags::empty();
        for (name, flag) in [
            ("wireframe", RenderFlags::WIREFRAME),
            ("backface", RenderFlags::BACKFACE),
            ("miniview", RenderFlags::MINIVIEW),
        ] {
            flags.set(flag, self.console.cvar_bool(name));
        }
        flags
    }

    /// Draws the current state.
    pub fn render_frame(&self, backend: &mut dyn RenderBackend) {
        backend.begin_frame(self.render_flags());
        backend.set_view(self.camera.view_matrix(self.player.position));

        for solid in self.world.solids() {
            backend.draw_solid(solid);
        }
        for item in &self.world.items {
            if let Some(model) = item.model_matrix(self.clock.now) {
                backend.draw_item(&item.kind, model);
            }
        }
        backend.draw_player(self.player.position, self.player.squash_scale());
        backend.draw_hearts(self.player.hearts);

        backend.end_frame();
    }

    /// Executes a console command.
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = tokens.split_first() else {
            return Ok(Vec::new());
        };

        match name {
            "map" => {
                let Some(id) = args.first() else {
                    return Ok(vec!["Usage: map <level>".to_string()]);
                };
                match self.load_level(id) {
                    Ok(()) => Ok(vec![format!("Level '{}' loaded", id)]),
                    Err(e) => Ok(vec![format!("Failed to load level: {:#}", e)]),
                }
            }
            "status" => Ok(self.status()),
            "kill" => {
                self.handle_outcome(&TickOutcome::Death)?;
                Ok(vec!["Killed".to_string()])
            }
            "restart" => {
                self.restart_level();
                Ok(vec![format!("Restarted '{}'", self.world.level())])
            }
            "key" => {
                let Some(key) = args.first() else {
                    return Ok(vec!["Usage: key <name> [down|up]".to_string()]);
                };
                let down = !matches!(args.get(1), Some(&"up"));
                self.handle_key(key, down);
                Ok(Vec::new())
            }
            "walk" => {
                let v = parse_floats::<3>(args).context("usage: walk <x> <y> <z>")?;
                self.apply(Command::Walk(Vec3::from_array(v)));
                Ok(Vec::new())
            }
            "pan" => {
                let v = parse_floats::<2>(args).context("usage: pan <x> <y>")?;
                self.apply(Command::Pan(Vec2::from_array(v)));
                Ok(Vec::new())
            }
            "jump" => {
                self.apply(Command::Jump);
                Ok(Vec::new())
            }
            "quit" | "exit" => {
                self.apply(Command::Quit);
                Ok(vec!["Bye".to_string()])
            }
            _ => self.console.exec(line),
        }
    }

    fn status(&self) -> Vec<String> {
        let p = &self.player;
        vec![
            format!("State: {:?}{}", self.state, if self.is_paused() { " (paused)" } else { "" }),
            format!("Level: {}", self.world.level()),
            format!("Tick: {} time: {:.2} rate: {}Hz", self.tick, self.clock.now, self.tick_hz()),
            format!(
                "Position: {:.3} {:.3} {:.3}",
                p.position.x, p.position.y, p.position.z
            ),
            format!(
                "Hearts: {} key: {} falling: {}",
                p.hearts, p.have_key, p.falling
            ),
            format!(
                "Camera: yaw {:.1} pitch {:.1}",
                self.camera.yaw.to_degrees(),
                self.camera.pitch.to_degrees()
            ),
            format!("Deaths: {}", self.deaths),
        ]
    }
}

fn parse_floats<const N: usize>(args: &[&str]) -> anyhow::Result<[f64; N]> {
    if args.len() != N {
        anyhow::bail!("expected {} numbers, got {}", N, args.len());
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().with_context(|| format!("bad number {arg:?}"))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::ItemKind;
    use maze_shared::{
        geometry::ConvexSolid,
        level::{FloorDesc, ItemDesc, LevelDesc, LevelSet},
        math::Mat4,
    };

    const DT: f64 = 1.0 / 60.0;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    fn flat(items: Vec<ItemDesc>, next_level: Option<&str>) -> LevelDesc {
        LevelDesc {
            start: Vec3::new(0.0, 0.0, 2.0),
            start_angle: [0.0, 0.0],
            doom_z: -20.0,
            next_level: next_level.map(str::to_string),
            floors: vec![FloorDesc {
                pos: Vec3::new(-5.0, -5.0, 0.0),
                edges: [Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 10.0, 0.0)],
                colour: "Red".to_string(),
                win: false,
            }],
            walls: vec![],
            items,
            colours: Default::default(),
        }
    }

    fn portal(to: Option<&str>) -> ItemDesc {
        ItemDesc::Portal {
            pos: Vec3::new(0.0, 0.0, 0.5),
            to: to.map(str::to_string),
            angle: 0.0,
        }
    }

    fn app(levels: LevelSet, start: &str) -> MazeApp {
        init_tracing();
        let cfg = MazeConfig {
            start_level: start.to_string(),
            ..MazeConfig::default()
        };
        MazeApp::new(cfg, Box::new(levels)).unwrap()
    }

    fn run_until_outcome(app: &mut MazeApp, ticks: usize) -> anyhow::Result<TickOutcome> {
        for _ in 0..ticks {
            let outcome = app.physics(DT)?;
            if !outcome.is_continue() {
                return Ok(outcome);
            }
        }
        Ok(TickOutcome::Continue)
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        flags: RenderFlags,
    }

    impl RenderBackend for Recorder {
        fn begin_frame(&mut self, flags: RenderFlags) {
            self.flags = flags;
            self.calls.push("begin".into());
        }
        fn set_view(&mut self, _view: Mat4) {
            self.calls.push("view".into());
        }
        fn draw_solid(&mut self, solid: &ConvexSolid) {
            self.calls.push(format!("solid {}", solid.material));
        }
        fn draw_item(&mut self, kind: &ItemKind, _model: Mat4) {
            self.calls.push(format!("item {kind:?}"));
        }
        fn draw_player(&mut self, _position: Vec3, _scale: Vec3) {
            self.calls.push("player".into());
        }
        fn draw_hearts(&mut self, hearts: u32) {
            self.calls.push(format!("hearts {hearts}"));
        }
        fn end_frame(&mut self) {
            self.calls.push("end".into());
        }
    }

    #[test]
    fn missing_start_level_is_an_error() {
        let cfg = MazeConfig::default();
        assert!(MazeApp::new(cfg, Box::new(LevelSet::new())).is_err());
    }

    #[test]
    fn portal_loads_next_level() {
        let levels = LevelSet::new()
            .with("a", flat(vec![portal(Some("b"))], None))
            .with("b", flat(vec![], None));
        let mut app = app(levels, "a");

        let outcome = run_until_outcome(&mut app, 60).unwrap();
        assert_eq!(outcome, TickOutcome::LevelChange("b".to_string()));
        assert_eq!(app.world().level(), "b");
        assert_eq!(app.player().position, app.world().start_pos());
        assert_eq!(app.state(), AppState::Running);
    }

    #[test]
    fn failed_level_change_keeps_level() {
        let levels = LevelSet::new().with("a", flat(vec![portal(Some("nowhere"))], None));
        let mut app = app(levels, "a");

        assert!(run_until_outcome(&mut app, 60).is_err());
        assert_eq!(app.world().level(), "a");

        // Back at the start, clear of the portal, rather than failing again
        // on every tick.
        assert_eq!(app.player().position, app.world().start_pos());
        assert_eq!(app.physics(DT).unwrap(), TickOutcome::Continue);
    }

    #[test]
    fn last_portal_wins() {
        let levels = LevelSet::new().with("a", flat(vec![portal(None)], None));
        let mut app = app(levels, "a");

        assert_eq!(run_until_outcome(&mut app, 60).unwrap(), TickOutcome::Victory);
        assert_eq!(app.state(), AppState::Won);

        let tick = app.tick();
        assert_eq!(app.physics(DT).unwrap(), TickOutcome::Continue);
        assert_eq!(app.tick(), tick);
    }

    #[test]
    fn kill_restarts_level() {
        let levels = LevelSet::new().with("a", flat(vec![], None));
        let mut app = app(levels, "a");
        run_until_outcome(&mut app, 10).unwrap();

        app.exec_console("kill").unwrap();
        assert_eq!(app.deaths(), 1);
        assert_eq!(app.player().position, app.world().start_pos());
        assert_eq!(app.player().hearts, app.cfg.movement.max_hearts);
    }

    #[test]
    fn pause_freezes_simulation() {
        let levels = LevelSet::new().with("a", flat(vec![], None));
        let mut app = app(levels, "a");

        app.frame(0.0).unwrap();
        app.frame(DT).unwrap();
        let z = app.player().position.z;

        app.handle_key("p", true);
        assert!(app.is_paused());
        for i in 2..30 {
            app.frame(i as f64 * DT).unwrap();
        }
        assert_eq!(app.player().position.z, z);

        app.exec_console("pause 0").unwrap();
        app.frame(30.0 * DT).unwrap();
        app.frame(31.0 * DT).unwrap();
        assert!(app.player().position.z < z);
        assert!((app.clock().now - 3.0 * DT).abs() < 1e-9);
    }

    #[test]
    fn walk_key_moves_player() {
        let levels = LevelSet::new().with("a", flat(vec![], None));
        let mut app = app(levels, "a");
        run_until_outcome(&mut app, 60).unwrap();
        assert!(app.player().is_grounded());

        app.exec_console("key w").unwrap();
        app.physics(DT).unwrap();
        app.physics(DT).unwrap();
        assert!(app.player().position.x > 0.0);

        app.exec_console("key w up").unwrap();
        let x = app.player().position.x;
        app.physics(DT).unwrap();
        assert_eq!(app.player().position.x, x);
    }

    #[test]
    fn held_walk_survives_level_change() {
        let levels = LevelSet::new()
            .with("a", flat(vec![portal(Some("b"))], None))
            .with("b", flat(vec![], None));
        let mut app = app(levels, "a");

        app.handle_key("w", true);
        let outcome = run_until_outcome(&mut app, 60).unwrap();
        assert_eq!(outcome, TickOutcome::LevelChange("b".to_string()));

        // Still held on the new level.
        assert_eq!(run_until_outcome(&mut app, 40).unwrap(), TickOutcome::Continue);
        assert!(app.player().is_grounded());
        assert!(app.player().position.x > 0.0);

        app.handle_key("w", false);
        assert_eq!(app.input().walking(), Vec3::ZERO);
        let x = app.player().position.x;
        for _ in 0..30 {
            app.physics(DT).unwrap();
        }
        assert_eq!(app.player().position.x, x);

        // A release with no press is dropped.
        app.handle_key("s", false);
        assert_eq!(app.input().walking(), Vec3::ZERO);
        app.physics(DT).unwrap();
        assert_eq!(app.player().position.x, x);
    }

    #[test]
    fn held_pan_survives_restart() {
        let levels = LevelSet::new().with("a", flat(vec![], None));
        let mut app = app(levels, "a");

        app.handle_key("l", true);
        app.exec_console("restart").unwrap();
        let yaw = app.camera().yaw;
        app.physics(DT).unwrap();
        assert_ne!(app.camera().yaw, yaw);

        app.handle_key("l", false);
        assert_eq!(app.camera().panning, Vec2::ZERO);
        let yaw = app.camera().yaw;
        for _ in 0..30 {
            app.physics(DT).unwrap();
        }
        assert_eq!(app.camera().yaw, yaw);
    }

    #[test]
    fn lowfps_halves_tick_rate() {
        let levels = LevelSet::new().with("a", flat(vec![], None));
        let mut app = app(levels, "a");
        assert_eq!(app.tick_hz(), 80);

        app.handle_key("f4", true);
        assert_eq!(app.tick_hz(), 40);
        // Key repeat does not toggle again.
        app.handle_key("f4", true);
        assert_eq!(app.tick_hz(), 40);

        app.handle_key("f4", false);
        app.handle_key("f4", true);
        assert_eq!(app.tick_hz(), 80);
    }

    #[test]
    fn console_commands() {
        let levels = LevelSet::new()
            .with("a", flat(vec![], None))
            .with("b", flat(vec![], None));
        let mut app = app(levels, "a");

        let out = app.exec_console("map b").unwrap();
        assert_eq!(out, vec!["Level 'b' loaded".to_string()]);
        assert_eq!(app.world().level(), "b");

        let out = app.exec_console("map c").unwrap();
        assert!(out[0].starts_with("Failed to load level"));
        assert_eq!(app.world().level(), "b");

        let out = app.exec_console("status").unwrap();
        assert!(out.iter().any(|l| l == "Level: b"));

        assert!(app.exec_console("walk 1 0").is_err());
        app.exec_console("pan 1 0").unwrap();
        app.physics(DT).unwrap();
        assert!(app.camera().yaw > 0.0);

        app.exec_console("quit").unwrap();
        assert_eq!(app.state(), AppState::Quit);
    }

    #[test]
    fn render_frame_order_and_flags() {
        let levels = LevelSet::new().with(
            "a",
            flat(vec![ItemDesc::Key { pos: Vec3::new(3.0, 3.0, 0.5) }], None),
        );
        let mut app = app(levels, "a");
        app.handle_key("f2", true);

        let mut r = Recorder::default();
        app.render_frame(&mut r);
        assert_eq!(r.flags, RenderFlags::WIREFRAME);
        assert_eq!(
            r.calls,
            vec![
                "begin",
                "view",
                "solid Red",
                "item Key { visible: true }",
                "player",
                "hearts 3",
                "end"
            ]
        );
    }
}
