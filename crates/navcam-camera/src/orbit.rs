//! Orbit geometry: pivot selection, yaw/pitch accumulation, and pivot-bypass
//! rotation with drift correction.

use glam::{Quat, Vec3};
use navcam_math::{
    ELEVATION_LIMIT_DEG, Plane, Ray, RayHit, angles_to_rotation, clamp_angle, elevation_deg,
    rotation_to_angles,
};

use crate::pose::{CameraPose, CameraTransform};

/// Below this many degrees an axis delta is treated as no input.
const MIN_STEP_DEG: f32 = 1e-3;

/// Where an orbit pivot came from, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PivotSource {
    /// Scene geometry under the pointer.
    SceneHit,
    /// The current navigation anchor.
    Anchor,
    /// The `y = 0` ground plane under the pointer.
    GroundPlane,
    /// A point along the pointer ray at the current distance.
    Projected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pivot {
    pub point: Vec3,
    pub source: PivotSource,
}

/// Picks the rotation centre for an orbit drag.
///
/// `pointer_hit` is the scene hit under the pointer (pass `None` to skip that
/// stage). The anchor is only usable while it lies in front of the camera.
pub fn select_pivot(
    pointer_hit: Option<RayHit>,
    pointer_ray: &Ray,
    camera: &CameraTransform,
    anchor: Vec3,
    distance: f32,
) -> Pivot {
    if let Some(hit) = pointer_hit
        && hit.point.is_finite()
    {
        return Pivot {
            point: hit.point,
            source: PivotSource::SceneHit,
        };
    }
    if anchor.is_finite() && (anchor - camera.position).dot(camera.forward()) > 1e-4 {
        return Pivot {
            point: anchor,
            source: PivotSource::Anchor,
        };
    }
    if let Some(point) = Plane::GROUND.raycast(pointer_ray) {
        return Pivot {
            point,
            source: PivotSource::GroundPlane,
        };
    }
    Pivot {
        point: pointer_ray.at(distance.max(0.0)),
        source: PivotSource::Projected,
    }
}

/// How a rotation drag moves the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitStyle {
    /// Accumulate yaw/pitch; the pose formula places the camera around the anchor.
    AnchorRelative,
    /// Rotate the camera transform itself around a pivot.
    PivotBypass,
}

/// Accumulated orbit angles in degrees. Roll is always zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitAngles {
    pub fn from_rotation(rotation: Quat) -> Self {
        let angles = rotation_to_angles(rotation);
        Self {
            yaw: angles.y,
            pitch: angles.x,
        }
    }

    pub fn rotation(&self) -> Quat {
        angles_to_rotation(Vec3::new(self.pitch, self.yaw, 0.0))
    }

    /// Adds a yaw/pitch delta.
    ///
    /// The pitch part is tested first: a candidate that reaches the ±89°
    /// elevation limit while moving further out is dropped for the whole
    /// frame. Otherwise it is clamped to `[min_pitch, max_pitch]`, widened to
    /// include the current pitch so a view set outside the range (a top view)
    /// eases back instead of snapping. Returns whether the pitch delta was
    /// accepted.
    pub fn apply(&mut self, d_yaw: f32, d_pitch: f32, min_pitch: f32, max_pitch: f32) -> bool {
        self.yaw = wrap_degrees(self.yaw + d_yaw);
        if d_pitch == 0.0 {
            return true;
        }
        let candidate = self.pitch + d_pitch;
        if candidate.abs() >= ELEVATION_LIMIT_DEG && candidate.abs() >= self.pitch.abs() {
            return false;
        }
        self.pitch = clamp_angle(
            candidate,
            min_pitch.min(self.pitch),
            max_pitch.max(self.pitch),
        );
        true
    }
}

/// Keeps accumulated yaw in `(-180, 180]`.
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Pivot-bypass orbit around a fixed point at a fixed radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PivotOrbit {
    pub pivot: Vec3,
    pub radius: f32,
}

impl PivotOrbit {
    pub fn new(pivot: Vec3, camera: &CameraTransform) -> Self {
        Self {
            pivot,
            radius: (camera.position - pivot).length(),
        }
    }

    /// Rotates `camera` by `d_yaw` around world up and by `d_pitch` around the
    /// camera's right axis, both through the pivot.
    ///
    /// The pitch step is simulated first and skipped when the resulting
    /// elevation would move further past ±89° or out of the
    /// `[min_pitch, max_pitch]` range. A camera already outside either limit
    /// may still step back toward it. Afterwards the camera is put back at exactly `radius` from the
    /// pivot. Returns whether the camera moved.
    pub fn step(
        &self,
        camera: &mut CameraTransform,
        d_yaw: f32,
        d_pitch: f32,
        min_pitch: f32,
        max_pitch: f32,
    ) -> bool {
        let mut moved = false;
        if d_yaw.abs() > MIN_STEP_DEG {
            camera.rotate_around(self.pivot, Quat::from_axis_angle(Vec3::Y, d_yaw.to_radians()));
            moved = true;
        }
        if d_pitch.abs() > MIN_STEP_DEG {
            let q = Quat::from_axis_angle(camera.right(), d_pitch.to_radians());
            let current = elevation_deg(camera.position - self.pivot);
            let elevation = elevation_deg(q * (camera.position - self.pivot));
            let toward_pole = elevation.abs() >= current.abs();
            let view_pitch = -elevation;
            if (elevation.abs() < ELEVATION_LIMIT_DEG || !toward_pole)
                && view_pitch >= min_pitch.min(-current)
                && view_pitch <= max_pitch.max(-current)
            {
                camera.rotate_around(self.pivot, q);
                moved = true;
            }
        }
        if moved {
            self.renormalize(camera);
        }
        moved
    }

    /// Removes radial drift accumulated by repeated rotations.
    pub fn renormalize(&self, camera: &mut CameraTransform) {
        let offset = camera.position - self.pivot;
        if let Some(dir) = offset.try_normalize() {
            camera.position = self.pivot + dir * self.radius;
        }
    }

    /// Pose to hand back to the anchor-relative formula when the drag ends.
    ///
    /// The distance becomes the camera-to-pivot distance (at least
    /// `min_distance`), the offset is kept, and the anchor is solved so that
    /// the formula reproduces the camera position exactly.
    pub fn release(
        &self,
        pose: &CameraPose,
        camera: &CameraTransform,
        min_distance: f32,
    ) -> CameraPose {
        let mut released = *pose;
        released.rotation = camera.rotation;
        released.distance = camera.position.distance(self.pivot).max(min_distance);
        released.anchor = released.anchor_for_position(camera.position);
        released
    }
}

/// Payload of the rotating mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitDrag {
    /// Angles accumulated since the drag started.
    AnchorRelative { angles: OrbitAngles },
    PivotBypass { orbit: PivotOrbit, source: PivotSource },
}

impl OrbitDrag {
    pub fn style(&self) -> OrbitStyle {
        match self {
            OrbitDrag::AnchorRelative { .. } => OrbitStyle::AnchorRelative,
            OrbitDrag::PivotBypass { .. } => OrbitStyle::PivotBypass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navcam_math::{FORWARD, look_rotation};

    fn camera_looking_at(position: Vec3, target: Vec3) -> CameraTransform {
        CameraTransform {
            position,
            rotation: look_rotation(target - position, Vec3::Y).unwrap(),
        }
    }

    #[test]
    fn test_pivot_prefers_scene_hit() {
        let cam = camera_looking_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO);
        let ray = Ray::new(cam.position, cam.forward());
        let hit = RayHit {
            point: Vec3::new(0.0, 1.0, 2.0),
            distance: 9.0,
        };
        let pivot = select_pivot(Some(hit), &ray, &cam, Vec3::ZERO, 11.0);
        assert_eq!(pivot.source, PivotSource::SceneHit);
        assert_eq!(pivot.point, hit.point);
    }

    #[test]
    fn test_pivot_falls_back_to_anchor_then_ground() {
        let cam = camera_looking_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO);
        let ray = Ray::new(cam.position, cam.forward());

        let pivot = select_pivot(None, &ray, &cam, Vec3::ZERO, 11.0);
        assert_eq!(pivot.source, PivotSource::Anchor);

        // Anchor behind the camera is not usable.
        let behind = cam.position - cam.forward() * 3.0;
        let pivot = select_pivot(None, &ray, &cam, behind, 11.0);
        assert_eq!(pivot.source, PivotSource::GroundPlane);
        assert!(pivot.point.y.abs() < 1e-4);
    }

    #[test]
    fn test_pivot_projected_when_ray_misses_ground() {
        let cam = CameraTransform {
            position: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let ray = Ray::new(cam.position, Vec3::new(0.0, 0.5, -1.0));
        let behind = cam.position + Vec3::new(0.0, 0.0, 4.0);
        let pivot = select_pivot(None, &ray, &cam, behind, 4.0);
        assert_eq!(pivot.source, PivotSource::Projected);
        assert!((pivot.point.distance(cam.position) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_angles_reject_pitch_past_elevation_limit() {
        let mut angles = OrbitAngles {
            yaw: 0.0,
            pitch: 85.0,
        };
        assert!(!angles.apply(0.0, 10.0, -89.0, 89.0));
        assert_eq!(angles.pitch, 85.0);
        assert!(angles.apply(0.0, 2.0, -89.0, 89.0));
        assert_eq!(angles.pitch, 87.0);
    }

    #[test]
    fn test_angles_leave_pole_in_small_steps() {
        let mut angles = OrbitAngles {
            yaw: 0.0,
            pitch: -90.0,
        };
        assert!(!angles.apply(0.0, -0.5, -89.0, 89.0));
        assert_eq!(angles.pitch, -90.0);
        assert!(angles.apply(0.0, 0.5, -89.0, 89.0));
        assert_eq!(angles.pitch, -89.5);
        assert!(angles.apply(0.0, 0.5, -89.0, 89.0));
        assert_eq!(angles.pitch, -89.0);
    }

    #[test]
    fn test_angles_outside_range_ease_back() {
        let mut angles = OrbitAngles {
            yaw: 0.0,
            pitch: 60.0,
        };
        angles.apply(0.0, -5.0, -45.0, 45.0);
        assert_eq!(angles.pitch, 55.0);
        angles.apply(0.0, 5.0, -45.0, 45.0);
        assert_eq!(angles.pitch, 55.0);
    }

    #[test]
    fn test_yaw_only_keeps_pitch_outside_range() {
        let mut angles = OrbitAngles {
            yaw: 0.0,
            pitch: -90.0,
        };
        assert!(angles.apply(10.0, 0.0, -89.0, 89.0));
        assert_eq!(angles.pitch, -90.0);
        assert_eq!(angles.yaw, 10.0);
    }

    #[test]
    fn test_angles_clamp_to_configured_range() {
        let mut angles = OrbitAngles::default();
        angles.apply(0.0, -60.0, -45.0, 45.0);
        assert_eq!(angles.pitch, -45.0);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut angles = OrbitAngles {
            yaw: 170.0,
            pitch: 0.0,
        };
        angles.apply(20.0, 0.0, -89.0, 89.0);
        assert!((angles.yaw - (-170.0)).abs() < 1e-4);
    }

    #[test]
    fn test_angles_rotation_roundtrip() {
        let angles = OrbitAngles {
            yaw: 40.0,
            pitch: -25.0,
        };
        let back = OrbitAngles::from_rotation(angles.rotation());
        assert!((back.yaw - 40.0).abs() < 1e-3);
        assert!((back.pitch + 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_bypass_preserves_radius_over_many_steps() {
        let pivot = Vec3::new(1.0, 0.5, -2.0);
        let mut cam = camera_looking_at(Vec3::new(4.0, 3.0, 5.0), pivot);
        let orbit = PivotOrbit::new(pivot, &cam);
        for i in 0..2000 {
            let d_pitch = if i % 2 == 0 { 0.7 } else { -0.69 };
            orbit.step(&mut cam, 0.37, d_pitch, -89.0, 89.0);
        }
        assert!((cam.position.distance(pivot) - orbit.radius).abs() < 1e-4);
        // Still looking at the pivot.
        let to_pivot = (pivot - cam.position).normalize();
        assert!(cam.forward().dot(to_pivot) > 0.9999);
    }

    #[test]
    fn test_bypass_pitch_stops_before_pole() {
        let pivot = Vec3::ZERO;
        let mut cam = camera_looking_at(Vec3::new(0.0, 0.0, 10.0), pivot);
        let orbit = PivotOrbit::new(pivot, &cam);
        for _ in 0..500 {
            // Negative pitch raises the camera over the pivot.
            orbit.step(&mut cam, 0.0, -1.0, -89.0, 89.0);
            assert!(elevation_deg(cam.position - pivot) < ELEVATION_LIMIT_DEG);
            assert!(cam.up().y > 0.0);
        }
        assert!(elevation_deg(cam.position - pivot) > 80.0);
    }

    #[test]
    fn test_bypass_leaves_pole_in_small_steps() {
        let pivot = Vec3::ZERO;
        let mut cam = CameraTransform {
            position: Vec3::new(0.0, 10.0, 0.0),
            rotation: angles_to_rotation(Vec3::new(-90.0, 0.0, 0.0)),
        };
        let orbit = PivotOrbit::new(pivot, &cam);
        let start = elevation_deg(cam.position - pivot);
        for _ in 0..20 {
            orbit.step(&mut cam, 0.0, 0.5, -89.0, 89.0);
        }
        let end = elevation_deg(cam.position - pivot);
        assert!(end < start - 5.0, "{start} -> {end}");
        assert!((cam.position.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_release_reproduces_camera_position() {
        let pivot = Vec3::new(0.0, 1.0, 0.0);
        let mut cam = camera_looking_at(Vec3::new(3.0, 4.0, 8.0), pivot);
        let orbit = PivotOrbit::new(pivot, &cam);
        orbit.step(&mut cam, 25.0, 10.0, -89.0, 89.0);

        let pose = CameraPose {
            anchor: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            distance: 3.0,
            offset: Vec3::new(0.2, -0.1, 0.4),
        };
        let released = orbit.release(&pose, &cam, 1.0);
        assert_eq!(released.offset, pose.offset);
        assert!((released.position() - cam.position).length() < 1e-4);
        assert!((released.rotation * FORWARD - cam.forward()).length() < 1e-6);
    }

    #[test]
    fn test_release_respects_min_distance() {
        let pivot = Vec3::ZERO;
        let cam = camera_looking_at(Vec3::new(0.0, 0.0, 0.5), pivot);
        let orbit = PivotOrbit::new(pivot, &cam);
        let released = orbit.release(&CameraPose::new(pivot, cam.rotation, 0.5), &cam, 1.0);
        assert_eq!(released.distance, 1.0);
        assert!((released.position() - cam.position).length() < 1e-5);
    }
}
