use glam::Vec3;

use crate::Ray;

/// Axis-Aligned Bounding Box in world space.
///
/// Invariant: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// The constructor enforces this by swapping components if needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corners. Automatically sorts
    /// components so that min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from a center point and half-extents.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        let half = half.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Returns the smallest AABB enclosing both self and other.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest edge length. This is the "object size" used for framing.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Returns true if the box has no usable extent: every edge is
    /// (near) zero, or a corner is not finite.
    pub fn is_degenerate(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite() || self.max_extent() <= f32::EPSILON
    }

    /// Slab test. Returns the ray parameter of the entry point, or `0.0`
    /// when the ray starts inside the box. `None` if the box is missed or
    /// lies entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);

        // NaN components (origin on a slab with zero direction) are dropped by
        // max_element/min_element, which is the behaviour we want for touching rays.
        let enter = t_near.max_element();
        let exit = t_far.min_element();
        if exit < enter.max(0.0) {
            return None;
        }
        Some(enter.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::splat(10.0))
    }

    #[test]
    fn test_contains_point_inside() {
        assert!(unit_box().contains_point(Vec3::splat(5.0)));
    }

    #[test]
    fn test_contains_point_outside() {
        assert!(!unit_box().contains_point(Vec3::new(11.0, 5.0, 5.0)));
    }

    #[test]
    fn test_contains_point_on_edge() {
        let aabb = unit_box();
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::splat(10.0)));
    }

    #[test]
    fn test_new_sorts_corners() {
        let aabb = Aabb::new(Vec3::new(4.0, -1.0, 2.0), Vec3::new(-4.0, 1.0, -2.0));
        assert_eq!(aabb.min, Vec3::new(-4.0, -1.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 1.0, 2.0));
    }

    #[test]
    fn test_union_encloses_both() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::splat(4.0));
    }

    #[test]
    fn test_max_extent_picks_largest_axis() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(0.5, 1.0, 0.25));
        assert!((aabb.max_extent() - 2.0).abs() < 1e-6);
        assert_eq!(aabb.center(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_size_is_degenerate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(Aabb::new(p, p).is_degenerate());
        assert!(!unit_box().is_degenerate());
    }

    #[test]
    fn test_non_finite_is_degenerate() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(f32::INFINITY, 1.0, 1.0));
        assert!(aabb.is_degenerate());
    }

    #[test]
    fn test_ray_hits_front_face() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = aabb.intersect_ray(&ray).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_box() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(aabb.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_box_behind_ray_is_missed() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(aabb.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_from_inside_reports_zero() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(aabb.intersect_ray(&ray), Some(0.0));
    }
}
