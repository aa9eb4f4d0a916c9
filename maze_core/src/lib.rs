//! `maze_core`
//!
//! The simulation side of the maze: the loaded level, the player's movement
//! state machine, the camera and the items placed in a level.
//!
//! Everything here is synchronous and single-threaded. One call to
//! [`player::Player::physics`] is one tick.

pub mod camera;
pub mod items;
pub mod outcome;
pub mod player;
pub mod render;
pub mod world;

pub use camera::Camera;
pub use items::{Item, ItemKind};
pub use outcome::TickOutcome;
pub use player::Player;
pub use render::{NullRenderer, RenderBackend, RenderFlags};
pub use world::{Collision, World};
