//! Collision geometry.
//!
//! Every floor and wall in a level is a parallelepiped, stored as the six
//! half-space planes bounding it. A point is inside a solid when it is
//! inside all six planes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::math::{Plane, Vec3};

/// Default downward thickness of floor slabs.
pub const FLOOR_THICKNESS: f64 = 0.2;

/// What a solid was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidKind {
    Floor,
    Wall,
}

/// A convex solid spanned by a corner and three edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvexSolid {
    pub kind: SolidKind,
    /// Material tag from the level file (a colour name today).
    pub material: String,
    pub corner: Vec3,
    pub edges: [Vec3; 3],
    pub planes: [Plane; 6],
    /// Landing on this solid wins the game.
    #[serde(default)]
    pub win: bool,
}

impl ConvexSolid {
    /// Builds the solid spanned by `p, p+e1, p+e2, p+e3`.
    ///
    /// The planes face outwards only if the edges follow the level winding,
    /// `dot(cross(e1, e2), e3) < 0`. This is not enforced.
    pub fn parallelepiped(
        kind: SolidKind,
        material: impl Into<String>,
        p: Vec3,
        e1: Vec3,
        e2: Vec3,
        e3: Vec3,
    ) -> Self {
        let px = p + e1 + e2 + e3;
        let planes = [
            Plane::from_vectors(p, e1, e2),
            Plane::from_vectors(p, e2, e3),
            Plane::from_vectors(p, e3, e1),
            Plane::from_vectors(px, e2, e1),
            Plane::from_vectors(px, e3, e2),
            Plane::from_vectors(px, e1, e3),
        ];

        let solid = Self {
            kind,
            material: material.into(),
            corner: p,
            edges: [e1, e2, e3],
            planes,
            win: false,
        };

        if solid.planes.iter().any(Plane::is_degenerate) {
            warn!(kind = ?kind, corner = ?p, "Degenerate solid: parallel edges");
        } else if solid.winding() >= 0.0 {
            warn!(kind = ?kind, corner = ?p, "Solid edges wound inside out");
        }

        solid
    }

    /// A floor slab: two horizontal edges and a fixed downward thickness.
    pub fn floor(material: impl Into<String>, p: Vec3, e1: Vec3, e2: Vec3, thickness: f64) -> Self {
        Self::parallelepiped(
            SolidKind::Floor,
            material,
            p,
            e1,
            e2,
            Vec3::new(0.0, 0.0, -thickness),
        )
    }

    /// A wall with all three edges given.
    pub fn wall(material: impl Into<String>, p: Vec3, e1: Vec3, e2: Vec3, e3: Vec3) -> Self {
        Self::parallelepiped(SolidKind::Wall, material, p, e1, e2, e3)
    }

    pub fn with_win(mut self, win: bool) -> Self {
        self.win = win;
        self
    }

    /// `dot(cross(e1, e2), e3)`; negative for correctly wound solids.
    pub fn winding(&self) -> f64 {
        let [e1, e2, e3] = self.edges;
        e1.cross(e2).dot(e3)
    }

    /// True if `p` is inside every plane, inflated by `margin`.
    pub fn contains(&self, p: Vec3, margin: f64) -> bool {
        self.planes.iter().all(|pl| pl.contains(p, margin))
    }

    /// The eight corners of the parallelepiped.
    pub fn corners(&self) -> [Vec3; 8] {
        let p = self.corner;
        let [e1, e2, e3] = self.edges;
        [
            p,
            p + e1,
            p + e2,
            p + e3,
            p + e1 + e2,
            p + e2 + e3,
            p + e1 + e3,
            p + e1 + e2 + e3,
        ]
    }

    pub fn centroid(&self) -> Vec3 {
        let [e1, e2, e3] = self.edges;
        self.corner + (e1 + e2 + e3) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn slab() -> ConvexSolid {
        ConvexSolid::floor(
            "Red",
            Vec3::new(-5.0, -5.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            FLOOR_THICKNESS,
        )
    }

    fn slanted_wall() -> ConvexSolid {
        ConvexSolid::wall(
            "Blue",
            Vec3::new(-9.0, -10.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(17.0, 3.0, 0.0),
            Vec3::new(0.0, -0.5, 0.0),
        )
    }

    #[test]
    fn corners_lie_on_boundary() {
        for solid in [slab(), slanted_wall()] {
            assert!(solid.winding() < 0.0);
            for c in solid.corners() {
                // On at least three planes, inside the rest.
                let on = solid.planes.iter().filter(|pl| pl.distance(c).abs() < EPS).count();
                assert!(on >= 3, "corner {c:?} on {on} planes");
                assert!(solid.contains(c, EPS));
            }
        }
    }

    #[test]
    fn centroid_is_inside_for_any_margin() {
        for solid in [slab(), slanted_wall()] {
            for margin in [0.0, 0.1, 0.49, 10.0] {
                assert!(solid.contains(solid.centroid(), margin));
            }
        }
    }

    #[test]
    fn floor_top_faces_up() {
        let solid = slab();
        assert!((solid.planes[0].normal - Vec3::Z).length() < EPS);
        assert!(!solid.contains(Vec3::new(0.0, 0.0, 0.5), 0.49));
        assert!(solid.contains(Vec3::new(0.0, 0.0, 0.48), 0.49));
    }

    #[test]
    fn outside_points_are_rejected() {
        let solid = slab();
        assert!(!solid.contains(Vec3::new(6.0, 0.0, -0.1), 0.0));
        assert!(!solid.contains(Vec3::new(0.0, 0.0, -0.5), 0.0));
        assert!(solid.contains(Vec3::new(5.4, 0.0, -0.1), 0.5));
    }
}
