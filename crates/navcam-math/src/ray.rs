use glam::Vec3;

/// A half-line in world space. `direction` is kept normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`. A zero direction falls back to `-Z`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a scene raycast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Infinite plane `normal · p + d = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// The `y = 0` ground plane.
    pub const GROUND: Plane = Plane {
        normal: Vec3::Y,
        d: 0.0,
    };

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Signed distance from the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Ray parameter of the intersection, if it lies in front of the origin.
    /// Rays parallel to the plane never hit.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -self.signed_distance(ray.origin) / denom;
        (t >= 0.0 && t.is_finite()).then_some(t)
    }

    /// Intersection point, see [`Plane::intersect_ray`].
    pub fn raycast(&self, ray: &Ray) -> Option<Vec3> {
        self.intersect_ray(ray).map(|t| ray.at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::NEG_Z);
    }

    #[test]
    fn test_ground_plane_hit() {
        let ray = Ray::new(Vec3::new(1.0, 10.0, 2.0), Vec3::NEG_Y);
        let hit = Plane::GROUND.raycast(&ray).unwrap();
        assert!((hit - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_plane_behind_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
        assert!(Plane::GROUND.raycast(&ray).is_none());
    }

    #[test]
    fn test_parallel_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(Plane::GROUND.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_view_plane_from_point_normal() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 0.0, -3.0), Vec3::NEG_Z);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.2, 0.0, -1.0));
        let hit = plane.raycast(&ray).unwrap();
        assert!((hit.z + 3.0).abs() < 1e-5);
        assert!(plane.signed_distance(hit).abs() < 1e-5);
    }
}
