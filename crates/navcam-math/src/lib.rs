//! Geometry primitives for camera navigation: bounding boxes, rays and planes,
//! and the angle / orientation helpers shared by the orbit and follow logic.

mod aabb;
mod angles;
mod ray;

pub use aabb::Aabb;
pub use angles::{
    ELEVATION_LIMIT_DEG, angle_between_deg, angles_to_rotation, clamp_angle, elevation_deg,
    look_rotation, rotation_to_angles,
};
pub use ray::{Plane, Ray, RayHit};

/// Camera-space forward axis. A camera with identity rotation looks down `-Z`.
pub const FORWARD: glam::Vec3 = glam::Vec3::NEG_Z;

/// Clamps `value` into `[0, 1]`, mapping non-finite input to `0`.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
