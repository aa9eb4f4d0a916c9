//! Headless maze binary.
//!
//! Usage:
//!   cargo run -p maze_app -- [--config maze.json] [--levels levels] [--level start]
//!                            [--tick-hz 80] [--ticks N]
//!
//! Runs the game loop at a fixed rate with a null renderer, reading console
//! commands from stdin. With `--ticks N` it runs N ticks, prints the status
//! and exits.
//!
//! Console commands:
//!   map <level>          - Load a level
//!   status               - Show game status
//!   key <name> [down|up] - Send a key event (w/a/s/d, i/j/k/l, space, p, f2..f4)
//!   lowfps 1             - Halve the tick rate (f4 toggles it)
//!   walk <x> <y> <z>     - Add to the held walk direction
//!   pan <x> <y>          - Add to the camera pan rate
//!   jump                 - Jump
//!   kill / restart       - Die / start the level over
//!   quit                 - Exit

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use maze_app::{AppState, MazeApp};
use maze_core::{NullRenderer, TickOutcome};
use maze_shared::{config::MazeConfig, level::LevelDir};
use tokio::sync::mpsc;
use tracing::info;

struct Args {
    config: Option<String>,
    levels: Option<String>,
    level: Option<String>,
    tick_hz: Option<u32>,
    ticks: Option<u64>,
}

fn parse_args() -> Args {
    let mut out = Args {
        config: None,
        levels: None,
        level: None,
        tick_hz: None,
        ticks: None,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(args[i + 1].clone());
                i += 2;
            }
            "--levels" if i + 1 < args.len() => {
                out.levels = Some(args[i + 1].clone());
                i += 2;
            }
            "--level" if i + 1 < args.len() => {
                out.level = Some(args[i + 1].clone());
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                out.tick_hz = args[i + 1].parse().ok();
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                out.ticks = args[i + 1].parse().ok();
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

fn load_config(args: &Args) -> anyhow::Result<MazeConfig> {
    let mut cfg = match &args.config {
        Some(path) => MazeConfig::load(path)?,
        None => MazeConfig::default(),
    };
    if let Some(levels) = &args.levels {
        cfg.levels_dir = levels.clone();
    }
    if let Some(level) = &args.level {
        cfg.start_level = level.clone();
    }
    if let Some(hz) = args.tick_hz {
        cfg.tick_hz = hz;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn spawn_stdin_reader(console_tx: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = load_config(&args).context("load config")?;
    info!(
        levels_dir = %cfg.levels_dir,
        level = %cfg.start_level,
        tick_hz = cfg.tick_hz,
        "Starting maze"
    );

    let levels = Box::new(LevelDir::new(&cfg.levels_dir));
    let mut app = MazeApp::new(cfg, levels).context("create app")?;
    let mut renderer = NullRenderer;

    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);
    if args.ticks.is_none() {
        spawn_stdin_reader(console_tx);
        println!("Maze ready. Type 'status' for info, 'help' for console help, 'quit' to exit.");
        println!();
    } else {
        drop(console_tx);
    }

    let mut tick_hz = app.tick_hz();
    let start = tokio::time::Instant::now();
    let mut next_tick = start;
    let mut sim_time = 0.0;

    loop {
        while let Ok(line) = console_rx.try_recv() {
            match app.exec_console(&line) {
                Ok(output) => {
                    for line in output {
                        println!("{}", line);
                    }
                }
                Err(e) => println!("Error: {:#}", e),
            }
        }

        if app.state() != AppState::Running {
            break;
        }
        if args.ticks.is_some_and(|n| app.tick() >= n) {
            break;
        }

        if app.tick_hz() != tick_hz {
            tick_hz = app.tick_hz();
            info!(tick_hz, "Tick rate changed");
        }
        let tick_interval = Duration::from_secs_f64(1.0 / f64::from(tick_hz));

        // In headless runs the simulation follows the tick count, not the wall clock.
        let real = match args.ticks {
            Some(_) => {
                sim_time += tick_interval.as_secs_f64();
                sim_time
            }
            None => start.elapsed().as_secs_f64(),
        };
        match app.frame(real) {
            Ok(TickOutcome::Continue) => {}
            Ok(outcome) => info!(?outcome, tick = app.tick(), "Tick outcome"),
            Err(e) => println!("Tick error: {:#}", e),
        }
        app.render_frame(&mut renderer);

        if args.ticks.is_none() {
            next_tick += tick_interval;
            tokio::time::sleep_until(next_tick).await;
        }
    }

    for line in app.exec_console("status")? {
        println!("{}", line);
    }
    info!(state = ?app.state(), ticks = app.tick(), deaths = app.deaths(), "Exiting");
    Ok(())
}
