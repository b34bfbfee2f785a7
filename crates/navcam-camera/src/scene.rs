//! The host scene as seen by the controller, and the lens that maps pointer
//! pixels into it.

use std::fmt;

use glam::{Vec2, Vec3};
use navcam_config::LensConfig;
use navcam_math::{Aabb, FORWARD, Ray, RayHit};

use crate::pose::CameraTransform;

/// Opaque handle to a scene entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Queries the controller makes against the host scene.
///
/// Implementations are read-only from the controller's point of view and are
/// only called from within [`update`](crate::NavigationController::update) or
/// the API calls that take a scene argument.
pub trait SceneQuery {
    /// Closest hit along `ray`, if any.
    fn raycast(&self, ray: &Ray) -> Option<RayHit>;

    /// World-space bounds of an entity. `None` when it has no geometry.
    fn world_bounds(&self, entity: EntityId) -> Option<Aabb>;

    /// Pivot position of an entity. `None` means the entity no longer exists.
    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// Combined bounds of everything visible, used to frame the whole scene.
    fn scene_bounds(&self) -> Option<Aabb> {
        None
    }
}

/// A scene with nothing in it. Rays only meet the implicit ground plane the
/// controller falls back to on its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl SceneQuery for EmptyScene {
    fn raycast(&self, _ray: &Ray) -> Option<RayHit> {
        None
    }

    fn world_bounds(&self, _entity: EntityId) -> Option<Aabb> {
        None
    }

    fn position(&self, _entity: EntityId) -> Option<Vec3> {
        None
    }
}

/// Vertical field of view plus viewport size in pixels. With `ortho_size`
/// set the projection is parallel and `ortho_size` is half the view height in
/// world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    pub fov_y_deg: f32,
    pub width: f32,
    pub height: f32,
    pub ortho_size: Option<f32>,
}

impl Default for Lens {
    fn default() -> Self {
        Self::from_config(&LensConfig::default())
    }
}

impl Lens {
    pub fn from_config(config: &LensConfig) -> Self {
        Self {
            fov_y_deg: config.fov_y_deg,
            width: config.viewport_width.max(1) as f32,
            height: config.viewport_height.max(1) as f32,
            ortho_size: config.orthographic.then_some(config.ortho_size),
        }
    }

    pub fn is_orthographic(&self) -> bool {
        self.ortho_size.is_some()
    }

    pub fn is_valid(&self) -> bool {
        let fov_ok = self.fov_y_deg > 1.0 && self.fov_y_deg < 179.0;
        let ortho_ok = self.ortho_size.is_none_or(|s| s.is_finite() && s > 0.0);
        fov_ok && ortho_ok && self.width > 0.0 && self.height > 0.0
    }

    /// Camera distance at which `bounds` fits the view with half a box of
    /// margin. `None` for degenerate bounds.
    pub fn fit_distance(&self, bounds: &Aabb) -> Option<f32> {
        if bounds.is_degenerate() {
            return None;
        }
        let size = bounds.max_extent();
        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let distance = size / tan_half + 0.5 * size;
        (distance.is_finite() && distance > 0.0).then_some(distance)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Viewport centre in pixels.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// World ray through pixel `pixel` (origin top-left, y down).
    pub fn viewport_ray(&self, camera: &CameraTransform, pixel: Vec2) -> Ray {
        let ndc_x = (pixel.x / self.width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (pixel.y / self.height) * 2.0;
        if let Some(size) = self.ortho_size {
            let offset = Vec3::new(ndc_x * size * self.aspect(), ndc_y * size, 0.0);
            return Ray::new(camera.position + camera.rotation * offset, camera.forward());
        }
        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let local = Vec3::new(ndc_x * tan_half * self.aspect(), ndc_y * tan_half, FORWARD.z);
        Ray::new(camera.position, camera.rotation * local)
    }

    /// World ray through the viewport centre.
    pub fn center_ray(&self, camera: &CameraTransform) -> Ray {
        self.viewport_ray(camera, self.center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn camera() -> CameraTransform {
        CameraTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
        }
    }

    #[test]
    fn test_center_ray_is_view_axis() {
        let lens = Lens::default();
        let cam = camera();
        let ray = lens.center_ray(&cam);
        assert!((ray.origin - cam.position).length() < 1e-6);
        assert!((ray.direction - cam.forward()).length() < 1e-5);
    }

    #[test]
    fn test_top_edge_ray_spans_half_fov() {
        let lens = Lens::default();
        let cam = CameraTransform {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        let ray = lens.viewport_ray(&cam, Vec2::new(lens.width * 0.5, 0.0));
        let angle = ray.direction.angle_between(FORWARD).to_degrees();
        assert!((angle - 30.0).abs() < 1e-3, "{angle}");
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn test_right_pixels_point_right() {
        let lens = Lens::default();
        let cam = CameraTransform {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        let ray = lens.viewport_ray(&cam, Vec2::new(lens.width, lens.height * 0.5));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y.abs() < 1e-6);
    }

    #[test]
    fn test_zero_viewport_is_clamped() {
        let lens = Lens::from_config(&LensConfig {
            fov_y_deg: 60.0,
            viewport_width: 0,
            viewport_height: 0,
            ..Default::default()
        });
        assert_eq!(lens.aspect(), 1.0);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let lens = Lens::from_config(&LensConfig {
            orthographic: true,
            ortho_size: 4.0,
            ..Default::default()
        });
        assert!(lens.is_orthographic());
        let cam = CameraTransform {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        let top = lens.viewport_ray(&cam, Vec2::new(lens.width * 0.5, 0.0));
        let center = lens.center_ray(&cam);
        assert!((top.direction - FORWARD).length() < 1e-6);
        assert!((center.direction - FORWARD).length() < 1e-6);
        assert!((top.origin - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_fit_distance_frames_bounds() {
        let lens = Lens::default();
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.5));
        // Size 2 at a 60 degree fov: 2 / tan(30) + 1.
        let d = lens.fit_distance(&bounds).unwrap();
        assert!((d - (2.0 / 30f32.to_radians().tan() + 1.0)).abs() < 1e-4, "{d}");
        assert!(lens.fit_distance(&Aabb::new(Vec3::ONE, Vec3::ONE)).is_none());
        assert!(!Lens { ortho_size: Some(0.0), ..lens }.is_valid());
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(EntityId(42).to_string(), "#42");
    }
}
