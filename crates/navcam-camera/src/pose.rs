//! Camera pose bookkeeping and publication.

use glam::{Quat, Vec3};
use navcam_math::FORWARD;
use tracing::warn;

/// The navigation state the camera transform is derived from.
///
/// The rendered position is never stored: it is always
/// `anchor - (rotation * FORWARD * distance + offset)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Look-at point the camera orbits and pans around.
    pub anchor: Vec3,
    /// Unit orientation.
    pub rotation: Quat,
    /// Distance from the anchor along the view axis.
    pub distance: f32,
    /// Extra displacement between the anchor and the view axis.
    pub offset: Vec3,
}

impl CameraPose {
    pub fn new(anchor: Vec3, rotation: Quat, distance: f32) -> Self {
        Self {
            anchor,
            rotation,
            distance,
            offset: Vec3::ZERO,
        }
    }

    /// Camera position derived from the pose.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.anchor - (self.rotation * FORWARD * self.distance + self.offset)
    }

    /// Transform the host should render with.
    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.position(),
            rotation: self.rotation,
        }
    }

    /// Anchor that reproduces `position` with this rotation, distance, and offset.
    #[inline]
    pub fn anchor_for_position(&self, position: Vec3) -> Vec3 {
        position + self.rotation * FORWARD * self.distance + self.offset
    }

    /// Offset that reproduces `position` with this anchor, rotation, and distance.
    #[inline]
    pub fn offset_for_position(&self, position: Vec3) -> Vec3 {
        self.anchor - position - self.rotation * FORWARD * self.distance
    }

    pub fn is_finite(&self) -> bool {
        self.anchor.is_finite()
            && self.rotation.is_finite()
            && self.distance.is_finite()
            && self.offset.is_finite()
    }
}

/// Final camera transform consumed by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraTransform {
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Orbit the transform around `pivot` by `rotation`.
    pub fn rotate_around(&mut self, pivot: Vec3, rotation: Quat) {
        self.position = pivot + rotation * (self.position - pivot);
        self.rotation = (rotation * self.rotation).normalize();
    }
}

/// Emits the transform for each frame and never lets a non-finite value out.
#[derive(Debug, Clone)]
pub struct PosePublisher {
    last: CameraTransform,
    rejected: u64,
}

impl PosePublisher {
    /// `initial` must be finite; it is what gets republished if the very
    /// first candidate is rejected.
    pub fn new(initial: CameraTransform) -> Self {
        Self {
            last: initial,
            rejected: 0,
        }
    }

    /// Publish `candidate`, or republish the previous transform if it is not finite.
    pub fn publish(&mut self, candidate: CameraTransform) -> CameraTransform {
        if candidate.is_finite() {
            self.last = candidate;
        } else {
            self.rejected += 1;
            warn!(
                ?candidate,
                rejected = self.rejected,
                "non-finite camera transform rejected, keeping previous"
            );
        }
        self.last
    }

    /// Most recently published transform.
    pub fn last(&self) -> CameraTransform {
        self.last
    }

    /// Number of candidates rejected so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> CameraPose {
        CameraPose {
            anchor: Vec3::new(2.0, 1.0, -3.0),
            rotation: Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.4),
            distance: 6.0,
            offset: Vec3::new(0.3, -0.2, 0.1),
        }
    }

    #[test]
    fn test_position_is_behind_anchor() {
        let p = CameraPose::new(Vec3::ZERO, Quat::IDENTITY, 5.0);
        assert!((p.position() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn test_anchor_back_solve_preserves_position() {
        let mut p = pose();
        let target = Vec3::new(-4.0, 7.0, 1.5);
        p.anchor = p.anchor_for_position(target);
        assert!((p.position() - target).length() < 1e-4);
    }

    #[test]
    fn test_offset_back_solve_preserves_position() {
        let mut p = pose();
        let before = p.position();
        p.anchor = Vec3::new(10.0, 0.0, 10.0);
        p.distance = 2.0;
        p.offset = p.offset_for_position(before);
        assert!((p.position() - before).length() < 1e-4);
    }

    #[test]
    fn test_rotate_around_keeps_radius() {
        let mut t = CameraTransform {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
        };
        t.rotate_around(Vec3::ZERO, Quat::from_rotation_y(1.0));
        assert!((t.position.length() - 5.0).abs() < 1e-5);
        // Still looking at the pivot.
        assert!((t.forward() - (-t.position.normalize())).length() < 1e-5);
    }

    #[test]
    fn test_publisher_rejects_non_finite() {
        let good = pose().transform();
        let mut publisher = PosePublisher::new(good);
        let bad = CameraTransform {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        assert_eq!(publisher.publish(bad), good);
        assert_eq!(publisher.rejected(), 1);

        let next = CameraTransform {
            position: Vec3::ONE,
            rotation: Quat::IDENTITY,
        };
        assert_eq!(publisher.publish(next), next);
        assert_eq!(publisher.last(), next);
    }
}
