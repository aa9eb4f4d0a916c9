//! `maze_app`
//!
//! The application around the core:
//! - `MazeApp`: owns the world, player and camera and runs the tick loop
//! - A pausable game clock
//! - Key bindings and held input
//!
//! Rendering and windowing stay behind `maze_core::RenderBackend`.

pub mod app;
pub mod clock;
pub mod input;

pub use app::{AppState, MazeApp};
