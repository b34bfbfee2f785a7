//! Smooth one-shot transition to a destination pose.

use navcam_math::{angle_between_deg, clamp01};

use crate::pose::{CameraPose, CameraTransform};

/// Position error the camera must get strictly below to count as arrived.
pub const ARRIVAL_DISTANCE: f32 = 0.01;
/// Rotation error in degrees below which the camera counts as arrived.
pub const ARRIVAL_ANGLE_DEG: f32 = 0.01;
/// Converts the configured speed into a per-second lerp rate.
const SPEED_SCALE: f32 = 5.0;

/// Payload of the interpolating mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolationRequest {
    /// Pose assigned verbatim on arrival.
    pub destination: CameraPose,
    pub speed: f32,
}

impl InterpolationRequest {
    pub fn new(destination: CameraPose, speed: f32) -> Self {
        Self { destination, speed }
    }

    /// Transform the camera is heading for.
    pub fn target(&self) -> CameraTransform {
        self.destination.transform()
    }

    /// Moves `camera` one frame toward the destination.
    ///
    /// Position lerps and rotation slerps at `speed * 5 * dt`. Each axis stops
    /// moving once inside its arrival epsilon; returns `true` when both are.
    pub fn step(&self, camera: &mut CameraTransform, dt: f32) -> bool {
        let target = self.target();
        let t = clamp01(self.speed * SPEED_SCALE * dt);

        let at_position = camera.position.distance(target.position) < ARRIVAL_DISTANCE;
        if !at_position {
            camera.position = camera.position.lerp(target.position, t);
        }

        let at_rotation = angle_between_deg(camera.rotation, target.rotation) < ARRIVAL_ANGLE_DEG;
        if !at_rotation {
            camera.rotation = camera.rotation.slerp(target.rotation, t).normalize();
        }

        at_position && at_rotation
    }
}
