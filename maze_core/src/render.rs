//! Rendering abstraction.
//!
//! The core never talks to a graphics API. A frame is handed to a
//! [`RenderBackend`] as a camera transform plus a list of things to draw.

use bitflags::bitflags;
use maze_shared::{
    geometry::ConvexSolid,
    math::{Mat4, Vec3},
};

use crate::items::ItemKind;

bitflags! {
    /// Per-frame drawing switches, driven by console variables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RenderFlags: u32 {
        /// Draw solids as outlines.
        const WIREFRAME = 1 << 0;
        /// Draw back faces too.
        const BACKFACE  = 1 << 1;
        /// Add a top-down view of the level.
        const MINIVIEW  = 1 << 2;
    }
}

/// What a renderer implementation has to provide.
///
/// Calls arrive in order: `begin_frame`, `set_view`, any number of draws,
/// `end_frame`.
pub trait RenderBackend: Send {
    fn begin_frame(&mut self, flags: RenderFlags);
    /// World to view transform for this frame.
    fn set_view(&mut self, view: Mat4);
    fn draw_solid(&mut self, solid: &ConvexSolid);
    fn draw_item(&mut self, kind: &ItemKind, model: Mat4);
    /// The player body, stretched per axis by `scale`.
    fn draw_player(&mut self, position: Vec3, scale: Vec3);
    fn draw_hearts(&mut self, hearts: u32);
    fn end_frame(&mut self);
}

/// A no-op renderer for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self, _flags: RenderFlags) {}
    fn set_view(&mut self, _view: Mat4) {}
    fn draw_solid(&mut self, _solid: &ConvexSolid) {}
    fn draw_item(&mut self, _kind: &ItemKind, _model: Mat4) {}
    fn draw_player(&mut self, _position: Vec3, _scale: Vec3) {}
    fn draw_hearts(&mut self, _hearts: u32) {}
    fn end_frame(&mut self) {}
}
