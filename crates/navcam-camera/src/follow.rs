//! Continuous tracking of a scene entity.

use glam::{Quat, Vec3};
use navcam_math::{Aabb, angle_between_deg, clamp01, look_rotation};
use tracing::debug;

use crate::orbit::OrbitAngles;
use crate::pose::CameraPose;
use crate::scene::EntityId;

pub const MIN_LERP_SPEED: f32 = 0.01;
pub const MAX_LERP_SPEED: f32 = 100.0;
/// Converts the lerp speed into a per-second rate.
const LERP_RATE: f32 = 10.0;
/// The initial lerp ends once the pose is this close to the follow pose.
const SETTLE_POSITION: f32 = 0.1;
const SETTLE_ANGLE_DEG: f32 = 1.0;
const SETTLE_DISTANCE: f32 = 0.1;
/// Extra distance per unit of object size when fitting it on screen.
const FIT_MARGIN: f32 = 0.3;

/// Options for [`start_following`](crate::NavigationController::start_following).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowParams {
    /// Camera distance; computed from the entity's bounds when `None`.
    pub distance: Option<f32>,
    /// Initial `(pitch, yaw, roll)` in degrees; looks at the entity when `None`.
    pub view_angles: Option<Vec3>,
    /// User may orbit around the entity while following.
    pub allow_rotation: bool,
    /// User may zoom while following.
    pub allow_zoom: bool,
    /// Tracking tightness, clamped to `[0.01, 100]`.
    pub lerp_speed: f32,
    /// Glide from the current pose into the follow pose instead of jumping.
    pub smooth_start: bool,
    /// Any pointer press ends following.
    pub stop_on_click: bool,
}

impl Default for FollowParams {
    fn default() -> Self {
        Self {
            distance: None,
            view_angles: None,
            allow_rotation: false,
            allow_zoom: false,
            lerp_speed: 1.0,
            smooth_start: true,
            stop_on_click: false,
        }
    }
}

impl FollowParams {
    pub fn clamped_lerp_speed(&self) -> f32 {
        if self.lerp_speed.is_finite() {
            self.lerp_speed.clamp(MIN_LERP_SPEED, MAX_LERP_SPEED)
        } else {
            1.0
        }
    }
}

/// The pose following settles into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowTarget {
    pub anchor: Vec3,
    pub rotation: Quat,
    pub distance: f32,
}

/// Payload of the following mode.
#[derive(Clone, Debug, PartialEq)]
pub struct FollowState {
    pub entity: EntityId,
    /// Distance the camera keeps when zoom is locked.
    pub distance: f32,
    pub allow_rotation: bool,
    pub allow_zoom: bool,
    pub stop_on_click: bool,
    pub lerp_speed: f32,
    /// Snapshot of the follow pose while the initial lerp runs.
    pub initial: Option<FollowTarget>,
    /// Orbit angles while the user is rotating around the entity.
    pub orbit: Option<OrbitAngles>,
}

impl FollowState {
    pub fn new(entity: EntityId, params: &FollowParams, target: FollowTarget) -> Self {
        Self {
            entity,
            distance: target.distance,
            allow_rotation: params.allow_rotation,
            allow_zoom: params.allow_zoom,
            stop_on_click: params.stop_on_click,
            lerp_speed: params.clamped_lerp_speed(),
            initial: params.smooth_start.then_some(target),
            orbit: None,
        }
    }

    pub fn in_initial_lerp(&self) -> bool {
        self.initial.is_some()
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbit.is_some()
    }

    /// Per-frame blend factor.
    pub fn lerp_factor(&self, dt: f32) -> f32 {
        clamp01(self.lerp_speed * LERP_RATE * dt)
    }

    /// Advances tracking by one frame.
    ///
    /// `camera_position` is the position published last frame; it is what the
    /// look-at is computed from when rotation is locked.
    pub fn step(
        &mut self,
        pose: &mut CameraPose,
        entity_position: Vec3,
        camera_position: Vec3,
        dt: f32,
    ) {
        let f = self.lerp_factor(dt);

        if let Some(target) = self.initial {
            pose.anchor = pose.anchor.lerp(target.anchor, f);
            pose.offset = pose.offset.lerp(Vec3::ZERO, f);
            pose.rotation = pose.rotation.slerp(target.rotation, f).normalize();
            pose.distance += (target.distance - pose.distance) * f;

            let settled = pose.anchor.distance(target.anchor) < SETTLE_POSITION
                && pose.offset.length() < SETTLE_POSITION
                && angle_between_deg(pose.rotation, target.rotation) < SETTLE_ANGLE_DEG
                && (pose.distance - target.distance).abs() < SETTLE_DISTANCE;
            if settled {
                pose.anchor = target.anchor;
                pose.offset = Vec3::ZERO;
                pose.rotation = target.rotation;
                pose.distance = target.distance;
                self.initial = None;
                debug!(entity = %self.entity, "follow initial lerp settled");
            }
            return;
        }

        pose.offset = Vec3::ZERO;
        pose.anchor = pose.anchor.lerp(entity_position, f);

        if !self.allow_zoom {
            pose.distance = self.distance;
        }
        if !self.allow_rotation
            && let Some(look) = look_rotation(pose.anchor - camera_position, Vec3::Y)
        {
            pose.rotation = pose.rotation.slerp(look, f).normalize();
        }
    }
}

/// Distance at which an object with `bounds` fills `screen_fraction` of the
/// viewport height, plus a margin of 0.3 object sizes.
///
/// Missing or degenerate bounds yield `fallback`. The result is clamped to
/// `[min_distance, max_distance]`.
pub fn optimal_distance(
    bounds: Option<Aabb>,
    fov_y_deg: f32,
    screen_fraction: f32,
    fallback: f32,
    min_distance: f32,
    max_distance: f32,
) -> f32 {
    let clamp = |d: f32| d.max(min_distance).min(max_distance);
    let Some(bounds) = bounds.filter(|b| !b.is_degenerate()) else {
        return clamp(fallback);
    };
    let size = bounds.max_extent();
    let view_height_per_unit = 2.0 * (fov_y_deg.to_radians() * 0.5).tan();
    let distance = size / (screen_fraction * view_height_per_unit) + FIT_MARGIN * size;
    if distance.is_finite() && distance > 0.0 {
        clamp(distance)
    } else {
        clamp(fallback)
    }
}
