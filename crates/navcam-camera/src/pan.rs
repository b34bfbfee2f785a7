//! Screen-space panning on a view-parallel plane.

use glam::{Vec2, Vec3};
use navcam_math::Plane;

use crate::pose::CameraTransform;
use crate::scene::Lens;

/// Payload of the panning mode.
///
/// The pan plane faces the camera at `plane_distance`, picked once when the
/// drag starts. Moving the pointer drags that plane, so geometry at that depth
/// stays under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanDrag {
    pub plane_distance: f32,
}

impl PanDrag {
    pub fn new(plane_distance: f32) -> Self {
        Self { plane_distance }
    }

    /// Plane distance from the closest pointer hit, or `default` when nothing
    /// was hit.
    pub fn plane_distance_for(hit_distance: Option<f32>, default: f32) -> f32 {
        match hit_distance {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => default,
        }
    }

    pub fn plane(&self, camera: &CameraTransform) -> Plane {
        let forward = camera.forward();
        Plane::from_point_normal(camera.position + forward * self.plane_distance, forward)
    }

    /// How far the anchor has to move so the plane point under the previous
    /// pointer position ends up under the current one.
    ///
    /// The result lies in the pan plane. `None` when either ray misses it.
    pub fn anchor_delta(
        &self,
        lens: &Lens,
        camera: &CameraTransform,
        pointer: Vec2,
        pointer_delta: Vec2,
    ) -> Option<Vec3> {
        if pointer_delta == Vec2::ZERO {
            return None;
        }
        let plane = self.plane(camera);
        let before = plane.raycast(&lens.viewport_ray(camera, pointer - pointer_delta))?;
        let now = plane.raycast(&lens.viewport_ray(camera, pointer))?;
        let forward = camera.forward();
        let delta = before - now;
        let delta = delta - forward * delta.dot(forward);
        delta.is_finite().then_some(delta)
    }
}
