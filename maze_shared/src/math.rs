//! Math types.
//!
//! Thin layer over `glam`'s f64 types. This is the only place in the
//! workspace that does cross products and trigonometry; everything else
//! goes through the helpers here.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

pub use glam::{DMat4 as Mat4, DQuat as Quat, DVec2 as Vec2, DVec3 as Vec3, DVec4 as Vec4};

/// World up. Floors are horizontal in the XY plane.
pub const UP: Vec3 = Vec3::Z;

/// A half-space `dot(normal, p) + offset <= 0`.
///
/// The normal points out of the half-space, so a positive
/// [`Plane::distance`] means the point is outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f64,
}

impl Plane {
    pub const fn new(normal: Vec3, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Plane through `p` spanned by `a` and `b`, facing `cross(a, b)`.
    ///
    /// Parallel `a` and `b` give a NaN normal; callers building level
    /// geometry are expected to pass non-degenerate edges.
    pub fn from_vectors(p: Vec3, a: Vec3, b: Vec3) -> Self {
        let normal = a.cross(b).normalize();
        Self {
            normal,
            offset: -normal.dot(p),
        }
    }

    /// The (A, B, C, D) form of the plane.
    pub fn homogeneous(&self) -> Vec4 {
        self.normal.extend(self.offset)
    }

    /// Signed distance of `p` from the plane, i.e. `dot((p, 1), (A, B, C, D))`.
    pub fn distance(&self, p: Vec3) -> f64 {
        p.extend(1.0).dot(self.homogeneous())
    }

    /// True if `p` is inside the half-space inflated by `margin`.
    pub fn contains(&self, p: Vec3, margin: f64) -> bool {
        self.distance(p) <= margin
    }

    pub fn is_degenerate(&self) -> bool {
        !self.normal.is_finite() || !self.offset.is_finite()
    }
}

/// Project `v` onto the plane through the origin with the given normal.
///
/// Removes the component of `v` along `normal`; applying it twice gives
/// the same vector. A `v` parallel to `normal` projects to zero.
pub fn project_onto_plane(normal: Vec3, v: Vec3) -> Vec3 {
    let len_sq = normal.length_squared();
    if len_sq == 0.0 {
        return v;
    }
    v - normal * (v.dot(normal) / len_sq)
}

/// Rotation by `angle` radians about `axis` (need not be normalized).
pub fn rotation_about(angle: f64, axis: Vec3) -> Quat {
    Quat::from_axis_angle(axis.normalize(), angle)
}

/// Rotation about the vertical axis only.
pub fn yaw_rotation(yaw: f64) -> Quat {
    rotation_about(yaw, UP)
}

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Clamps a pitch angle into `[-π/2, π/2]`.
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// Converts a `(yaw, pitch)` pair given in degrees to radians.
pub fn angles_to_radians(degrees: [f64; 2]) -> (f64, f64) {
    (degrees[0].to_radians(), degrees[1].to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn plane_from_vectors_faces_cross_product() {
        let pl = Plane::from_vectors(Vec3::new(0.0, 0.0, 2.0), Vec3::X * 3.0, Vec3::Y * 5.0);
        assert_vec_eq(pl.normal, Vec3::Z);
        assert!((pl.offset + 2.0).abs() < EPS);
        assert!((pl.distance(Vec3::new(7.0, -1.0, 3.0)) - 1.0).abs() < EPS);
        assert!(pl.contains(Vec3::new(0.0, 0.0, 2.5), 0.5));
        assert!(!pl.contains(Vec3::new(0.0, 0.0, 2.6), 0.5));
    }

    #[test]
    fn homogeneous_matches_distance() {
        let pl = Plane::from_vectors(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 0.0), Vec3::Z);
        let p = Vec3::new(-4.0, 0.5, 9.0);
        let h = pl.homogeneous();
        assert!((h.truncate().dot(p) + h.w - pl.distance(p)).abs() < EPS);
    }

    #[test]
    fn parallel_edges_give_degenerate_plane() {
        let pl = Plane::from_vectors(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(pl.is_degenerate());
    }

    #[test]
    fn projection_is_idempotent() {
        let n = Vec3::new(0.3, -0.2, 0.9).normalize();
        let v = Vec3::new(4.0, 1.0, -2.0);
        let once = project_onto_plane(n, v);
        let twice = project_onto_plane(n, once);
        assert_vec_eq(once, twice);
        assert!(once.dot(n).abs() < EPS);
    }

    #[test]
    fn projection_of_parallel_vector_is_zero() {
        assert_vec_eq(project_onto_plane(Vec3::Z, Vec3::Z * -3.0), Vec3::ZERO);
    }

    #[test]
    fn yaw_rotation_turns_x_towards_y() {
        let q = yaw_rotation(PI / 2.0);
        assert_vec_eq(q * Vec3::X, Vec3::Y);
        assert_vec_eq(q * Vec3::Z, Vec3::Z);
    }

    #[test]
    fn quaternion_composition() {
        let q = yaw_rotation(PI / 4.0) * yaw_rotation(PI / 4.0);
        assert_vec_eq(q * Vec3::X, Vec3::Y);
    }

    #[test]
    fn wrap_and_clamp() {
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < EPS);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < EPS);
        assert!(wrap_angle(-1e-18) < TAU);
        assert_eq!(clamp_pitch(2.0), FRAC_PI_2);
        assert_eq!(clamp_pitch(-2.0), -FRAC_PI_2);
    }
}
