//! `maze_shared`
//!
//! Libraries shared by the core and the app.
//!
//! Design goals:
//! - One home for vector/quaternion/plane math.
//! - Level data is plain serde structs; building collision geometry from it
//!   is the core's job.
//! - No `unsafe`.

pub mod config;
pub mod console;
pub mod geometry;
pub mod level;
pub mod math;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::geometry::*;
    pub use crate::level::*;
    pub use crate::math::*;
}
