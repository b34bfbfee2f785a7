//! The navigation controller.
//!
//! [`NavigationController::update`] runs once per frame: it advances follow
//! tracking or an interpolation, turns the frame's input into drags and zoom,
//! damps the pose toward its targets, and publishes a camera transform. The
//! remaining methods are the programmatic API (pose assignment, focus, follow,
//! viewpoints, scene framing) and may be called between frames.

use glam::{Quat, Vec2, Vec3};
use navcam_config::{Config, ConfigError, Viewpoint};
use navcam_input::{InputFrame, NavKeys, PointerButton};
use navcam_math::{
    FORWARD, Plane, RayHit, angles_to_rotation, clamp01, look_rotation, rotation_to_angles,
};
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::error::NavError;
use crate::follow::{FollowParams, FollowState, FollowTarget, optimal_distance};
use crate::interpolator::InterpolationRequest;
use crate::observer::{NavEvent, Observers, Subscription, SubscriptionId};
use crate::orbit::{OrbitAngles, OrbitDrag, Pivot, PivotOrbit, PivotSource, select_pivot};
use crate::pan::PanDrag;
use crate::pose::{CameraPose, CameraTransform, PosePublisher};
use crate::scene::{EntityId, Lens, SceneQuery};
use crate::state::{NavMode, NavModeKind, NavStateMachine};

/// Per-second rates the damping settings are multiplied with.
const ROTATION_DAMPING_RATE: f32 = 6.0;
const PAN_DAMPING_RATE: f32 = 10.0;
const ZOOM_DAMPING_RATE: f32 = 10.0;

/// Fraction of the distance one scroll line zooms at factor 1.
const SCROLL_ZOOM_PER_LINE: f32 = 0.2275;
/// Fraction of the distance one pixel of pinch spread zooms.
const PINCH_ZOOM_PER_PIXEL: f32 = 0.0042;
/// Fraction of the distance one pixel of vertical zoom-drag zooms.
const DRAG_ZOOM_PER_PIXEL: f32 = 0.005;
/// Degrees of rotation per pixel of one-finger drag at speed 1.
const TOUCH_DEGREES_PER_PIXEL: f32 = 0.4;

/// A pivot closer than this to the camera cannot be orbited.
const MIN_PIVOT_DISTANCE: f32 = 1e-4;

/// World units per second an arrow key moves the anchor at speed 1.
const KEY_TRAVEL_PER_SECOND: f32 = 1.2;
/// Smallest orthographic half-height zoom can reach.
const MIN_ORTHO_SIZE: f32 = 0.01;

pub struct NavigationController {
    config: Config,
    lens: Lens,
    state: NavStateMachine,
    /// Anchor-relative pose. Drives the camera except during pivot-bypass
    /// rotation and interpolation.
    pose: CameraPose,
    /// Last published transform; authoritative while `pose` is not.
    camera: CameraTransform,
    anchor_target: Vec3,
    desired_rotation: Quat,
    desired_distance: f32,
    publisher: PosePublisher,
    observers: Observers,
    cache: QueryCache,
    frame: u64,
    rotation_blocked: bool,
    left_rotation_blocked: bool,
}

impl NavigationController {
    /// Creates a controller with the camera at the origin looking down `-Z`
    /// at an anchor `zoom.initial_distance` away.
    ///
    /// `config` is validated first; an invalid configuration is rejected.
    pub fn new(config: Config) -> Result<Self, NavError> {
        config.validate()?;
        let distance = config
            .zoom
            .initial_distance
            .clamp(config.zoom.min_distance, config.zoom.max_distance);
        let pose = CameraPose::new(FORWARD * distance, Quat::IDENTITY, distance);
        let camera = pose.transform();
        info!(
            distance,
            pivot_bypass = config.orbit.pivot_bypass,
            "navigation controller created"
        );
        Ok(Self {
            lens: Lens::from_config(&config.lens),
            config,
            state: NavStateMachine::new(),
            pose,
            camera,
            anchor_target: pose.anchor,
            desired_rotation: pose.rotation,
            desired_distance: pose.distance,
            publisher: PosePublisher::new(camera),
            observers: Observers::new(),
            cache: QueryCache::new(),
            frame: 0,
            rotation_blocked: false,
            left_rotation_blocked: false,
        })
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Runs one frame and returns the transform to render with.
    ///
    /// A negative or non-finite `dt` is treated as zero. The returned
    /// transform is always finite.
    pub fn update(
        &mut self,
        input: &InputFrame,
        scene: &dyn SceneQuery,
        dt: f32,
    ) -> CameraTransform {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.frame += 1;
        self.cache.begin_frame(self.frame);
        let checkpoint = self.pose;

        let follow = self.follow_state().map(|f| (f.entity, f.stop_on_click));
        if let Some((entity, stop_on_click)) = follow {
            if stop_on_click && input.any_pressed() {
                info!(%entity, "pointer press ended follow mode");
                self.stop_following(scene);
                return self.publish(checkpoint);
            }
            let Some(position) = scene.position(entity) else {
                warn!(%entity, "followed entity disappeared, leaving follow mode");
                self.stop_following(scene);
                return self.publish(checkpoint);
            };
            self.follow_step(position, dt);
        }

        if let NavMode::Interpolating(request) = self.state.mode() {
            let request = *request;
            if request.step(&mut self.camera, dt) {
                self.finish_interpolation(request);
            }
            return self.publish(checkpoint);
        }

        self.handle_input(input, scene, dt);
        self.apply_damping(dt);
        self.publish(checkpoint)
    }

    fn follow_step(&mut self, entity_position: Vec3, dt: f32) {
        let camera_position = self.camera.position;
        let NavMode::Following(follow) = self.state.mode_mut() else {
            return;
        };
        // Checked before stepping: the settling frame snaps the pose and its
        // targets must take the snapped values too.
        let was_initial = follow.in_initial_lerp();
        follow.step(&mut self.pose, entity_position, camera_position, dt);

        self.anchor_target = self.pose.anchor;
        if was_initial || !follow.allow_rotation {
            self.desired_rotation = self.pose.rotation;
        }
        if was_initial {
            self.desired_distance = self.pose.distance;
        } else if !follow.allow_zoom {
            self.desired_distance = follow.distance;
        }
    }

    fn finish_interpolation(&mut self, request: InterpolationRequest) {
        if self.enter(NavMode::Idle).is_err() {
            return;
        }
        self.assign_pose(request.destination);
        self.observers.emit(NavEvent::InterpolationFinished);
        info!(anchor = ?self.pose.anchor, "interpolation finished");
    }

    fn handle_input(&mut self, input: &InputFrame, scene: &dyn SceneQuery, dt: f32) {
        if let Some(preset) = input.view_preset {
            debug!(?preset, "view preset");
            self.set_view_direction(preset.angles_deg());
        }
        if input.reset_view
            && let Err(err) = self.reset_view(scene)
        {
            debug!(%err, "reset view ignored");
        }
        if self.is_interpolating() {
            return;
        }

        let rotate_button = if self.config.orbit.rotate_with_left_button {
            PointerButton::Left
        } else {
            PointerButton::Right
        };
        let rotate = input.button(rotate_button);
        let middle = input.button(PointerButton::Middle);
        let one_finger = input.touching && !input.is_two_finger;
        let two_finger = input.touching && input.is_two_finger;

        // Drags last while their button (or finger count) is held. Ending
        // them first lets a gesture change start the next drag this frame.
        let blocked = self.user_rotation_blocked();
        let rotate_held = !blocked && (rotate.held || one_finger);
        if !rotate_held {
            self.end_rotation();
        }
        if self.state.kind() == NavModeKind::Panning && !(middle.held || two_finger) {
            let _ = self.enter(NavMode::Idle);
        }

        let rotate_pressed =
            !blocked && ((rotate.pressed && rotate.held) || (input.touch_began && one_finger));
        match self.state.kind() {
            NavModeKind::Idle if (middle.pressed && middle.held) || two_finger => {
                self.begin_pan(input, scene);
            }
            NavModeKind::Idle if rotate_pressed => self.begin_rotation(input, scene),
            NavModeKind::Following if rotate_pressed => self.begin_follow_orbit(),
            _ => {}
        }

        let fine = if input.modifiers.fine {
            self.config.input.fine_factor
        } else {
            1.0
        };
        let sensitivity = self.config.input.master_sensitivity * fine;
        let (d_yaw, d_pitch) = self.rotation_delta(input, sensitivity);
        let (min_pitch, max_pitch) = (self.config.orbit.min_pitch_deg, self.config.orbit.max_pitch_deg);

        match self.state.mode_mut() {
            NavMode::Rotating(OrbitDrag::AnchorRelative { angles }) => {
                angles.apply(d_yaw, d_pitch, min_pitch, max_pitch);
                self.desired_rotation = angles.rotation();
            }
            NavMode::Rotating(OrbitDrag::PivotBypass { orbit, .. }) => {
                if orbit.step(&mut self.camera, d_yaw, d_pitch, min_pitch, max_pitch) {
                    self.pose.rotation = self.camera.rotation;
                    self.desired_rotation = self.camera.rotation;
                }
            }
            NavMode::Following(follow) => {
                if let Some(angles) = follow.orbit.as_mut() {
                    angles.apply(d_yaw, d_pitch, min_pitch, max_pitch);
                    self.desired_rotation = angles.rotation();
                }
            }
            NavMode::Panning(drag) => {
                let drag = *drag;
                if input.modifiers.zoom && middle.held {
                    let change = input.mouse_delta.y * DRAG_ZOOM_PER_PIXEL * self.config.zoom.drag_speed;
                    self.zoom_by(-change * sensitivity);
                } else {
                    let delta = if two_finger { input.touch_delta } else { input.mouse_delta };
                    if let Some(shift) = drag.anchor_delta(&self.lens, &self.camera, input.pointer, delta) {
                        self.anchor_target += shift;
                    }
                }
            }
            NavMode::Idle | NavMode::Interpolating(_) => {}
        }

        if (input.scroll_delta != 0.0 || input.pinch_delta != 0.0) && self.zoom_allowed() {
            self.zoom(input, scene, sensitivity);
        }

        if self.config.spatial.enabled
            && !input.spatial.is_zero()
            && matches!(self.state.kind(), NavModeKind::Idle | NavModeKind::Panning)
        {
            self.apply_spatial(input, fine);
        }

        if input.keys.any()
            && !input.modifiers.zoom
            && matches!(
                self.state.mode(),
                NavMode::Idle | NavMode::Panning(_) | NavMode::Rotating(OrbitDrag::AnchorRelative { .. })
            )
        {
            self.apply_keys(&input.keys, input.modifiers.fine, dt);
        }
    }

    /// Arrow keys move the anchor along the view's right and up axes; with
    /// `along_view` (the fine modifier) up and down move along the view
    /// direction instead.
    fn apply_keys(&mut self, keys: &NavKeys, along_view: bool, dt: f32) {
        let axes = keys.axes();
        let vertical = if along_view { FORWARD } else { Vec3::Y };
        let local = Vec3::X * axes.x + vertical * axes.y;
        let step = self.config.input.key_speed
            * self.config.input.master_sensitivity
            * KEY_TRAVEL_PER_SECOND
            * dt;
        self.anchor_target += self.desired_rotation * local * step;
    }

    fn user_rotation_blocked(&self) -> bool {
        self.rotation_blocked || (self.left_rotation_blocked && self.config.orbit.rotate_with_left_button)
    }

    /// Yaw and pitch deltas in degrees for this frame.
    fn rotation_delta(&self, input: &InputFrame, sensitivity: f32) -> (f32, f32) {
        if input.touching && !input.is_two_finger && input.touch_delta != Vec2::ZERO {
            let touch = &self.config.touch;
            let mut delta = input.touch_delta;
            if touch.invert_horizontal {
                delta.x = -delta.x;
            }
            if touch.invert_vertical {
                delta.y = -delta.y;
            }
            let scale = TOUCH_DEGREES_PER_PIXEL * touch.rotation_speed * sensitivity;
            return (-delta.x * scale, -delta.y * scale);
        }
        let scale = self.config.orbit.degrees_per_pixel * sensitivity;
        (-input.mouse_delta.x * scale, -input.mouse_delta.y * scale)
    }

    fn zoom_allowed(&self) -> bool {
        match self.state.mode() {
            NavMode::Following(follow) => follow.allow_zoom && !follow.in_initial_lerp(),
            NavMode::Rotating(OrbitDrag::PivotBypass { .. }) | NavMode::Interpolating(_) => false,
            _ => true,
        }
    }

    fn zoom(&mut self, input: &InputFrame, scene: &dyn SceneQuery, sensitivity: f32) {
        let zoom = self.config.zoom.clone();
        let mut change = 0.0;
        if input.scroll_delta != 0.0 {
            let factor = match self.pointer_hit(input.pointer, scene) {
                Some(hit) if hit.distance > zoom.near_threshold => zoom.far_factor,
                _ => zoom.near_factor,
            };
            change += input.scroll_delta * factor * SCROLL_ZOOM_PER_LINE * zoom.speed * sensitivity;
        }
        if input.pinch_delta != 0.0 {
            change += input.pinch_delta * PINCH_ZOOM_PER_PIXEL * self.config.touch.zoom_speed * sensitivity;
        }
        self.zoom_by(change);
    }

    /// Zooms in by `fraction` of the current distance; negative zooms out.
    /// An orthographic lens scales its view size instead, within
    /// `[MIN_ORTHO_SIZE, zoom.max_distance]`.
    fn zoom_by(&mut self, fraction: f32) {
        if let Some(size) = self.lens.ortho_size {
            let size = (size - fraction * size).clamp(MIN_ORTHO_SIZE, self.config.zoom.max_distance);
            self.lens.ortho_size = Some(size);
            self.cache.invalidate();
            return;
        }
        self.desired_distance -= fraction * self.pose.distance.abs();
        self.clamp_desired_distance();
    }

    /// Keeps the desired distance within limits. Zooming in past the minimum
    /// pushes the anchor forward instead, except while following.
    fn clamp_desired_distance(&mut self) {
        let (min, max) = (self.config.zoom.min_distance, self.config.zoom.max_distance);
        if self.desired_distance > max {
            self.desired_distance = max;
        }
        if self.desired_distance <= min {
            let excess = min - self.desired_distance;
            self.desired_distance = min;
            if excess > 0.0 && self.state.kind() != NavModeKind::Following {
                self.anchor_target += self.pose.transform().forward() * excess;
            }
        }
    }

    fn apply_spatial(&mut self, input: &InputFrame, fine: f32) {
        let spatial = &self.config.spatial;
        let translation = input.spatial.translation * spatial.translation_speed * fine;
        self.anchor_target += self.desired_rotation * translation;

        let rotation = input.spatial.rotation * spatial.rotation_speed * fine;
        if rotation != Vec3::ZERO {
            let mut angles = OrbitAngles::from_rotation(self.desired_rotation);
            angles.apply(
                rotation.y,
                rotation.x,
                self.config.orbit.min_pitch_deg,
                self.config.orbit.max_pitch_deg,
            );
            self.desired_rotation = angles.rotation();
        }
    }

    fn pointer_hit(&mut self, pointer: Vec2, scene: &dyn SceneQuery) -> Option<RayHit> {
        let ray = self.lens.viewport_ray(&self.camera, pointer);
        self.cache.pointer_hit(pointer, || scene.raycast(&ray))
    }

    fn begin_rotation(&mut self, input: &InputFrame, scene: &dyn SceneQuery) {
        if !self.config.orbit.pivot_bypass {
            self.desired_rotation = self.pose.rotation;
            let angles = OrbitAngles::from_rotation(self.pose.rotation);
            let _ = self.enter(NavMode::Rotating(OrbitDrag::AnchorRelative { angles }));
            return;
        }

        let ray = self.lens.viewport_ray(&self.camera, input.pointer);
        let hit = if self.config.orbit.pivot_on_pointer_hit {
            self.pointer_hit(input.pointer, scene)
        } else {
            None
        };
        let mut pivot = select_pivot(hit, &ray, &self.camera, self.pose.anchor, self.pose.distance);
        if pivot.point.distance(self.camera.position) < MIN_PIVOT_DISTANCE {
            pivot = Pivot {
                point: ray.at(self.pose.distance.max(self.config.zoom.min_distance)),
                source: PivotSource::Projected,
            };
        }
        debug!(point = ?pivot.point, source = ?pivot.source, "orbit pivot selected");

        let orbit = PivotOrbit::new(pivot.point, &self.camera);
        self.pose.rotation = self.camera.rotation;
        self.desired_rotation = self.camera.rotation;
        let _ = self.enter(NavMode::Rotating(OrbitDrag::PivotBypass {
            orbit,
            source: pivot.source,
        }));
    }

    fn begin_follow_orbit(&mut self) {
        if let NavMode::Following(follow) = self.state.mode_mut()
            && follow.allow_rotation
            && !follow.in_initial_lerp()
            && follow.orbit.is_none()
        {
            follow.orbit = Some(OrbitAngles::from_rotation(self.pose.rotation));
            self.desired_rotation = self.pose.rotation;
            self.observers.emit(NavEvent::FollowOrbit { active: true });
            debug!(entity = %follow.entity, "orbiting followed entity");
        }
    }

    /// Ends a rotation drag or a follow orbit. No-op otherwise.
    ///
    /// A pivot-bypass drag hands back to the anchor-relative formula with the
    /// camera exactly where the drag left it.
    fn end_rotation(&mut self) {
        match self.state.mode_mut() {
            NavMode::Rotating(OrbitDrag::PivotBypass { orbit, .. }) => {
                let orbit = *orbit;
                self.pose = orbit.release(&self.pose, &self.camera, self.config.zoom.min_distance);
                self.sync_targets();
                let _ = self.enter(NavMode::Idle);
            }
            NavMode::Rotating(OrbitDrag::AnchorRelative { .. }) => {
                let _ = self.enter(NavMode::Idle);
            }
            NavMode::Following(follow) if follow.is_orbiting() => {
                follow.orbit = None;
                self.observers.emit(NavEvent::FollowOrbit { active: false });
            }
            _ => {}
        }
    }

    fn begin_pan(&mut self, input: &InputFrame, scene: &dyn SceneQuery) {
        let hit = self.pointer_hit(input.pointer, scene);
        let plane_distance =
            PanDrag::plane_distance_for(hit.map(|h| h.distance), self.config.pan.default_plane_distance);
        self.anchor_target = self.pose.anchor;
        if self.enter(NavMode::Panning(PanDrag::new(plane_distance))).is_ok() {
            debug!(plane_distance, "pan started");
        }
    }

    fn apply_damping(&mut self, dt: f32) {
        let (following, rotation_free, initial) = match self.state.mode() {
            NavMode::Rotating(OrbitDrag::PivotBypass { .. }) | NavMode::Interpolating(_) => return,
            NavMode::Following(follow) => (
                true,
                follow.allow_rotation && !follow.in_initial_lerp(),
                follow.in_initial_lerp(),
            ),
            _ => (false, true, false),
        };

        if rotation_free {
            let t = clamp01(dt * self.config.orbit.damping * ROTATION_DAMPING_RATE);
            self.pose.rotation = self.pose.rotation.slerp(self.desired_rotation, t).normalize();
        }
        if !following {
            let t = clamp01(dt * self.config.pan.damping * PAN_DAMPING_RATE);
            self.pose.anchor = self.pose.anchor.lerp(self.anchor_target, t);
        }
        if !initial {
            let t = clamp01(dt * self.config.zoom.damping * ZOOM_DAMPING_RATE);
            self.pose.distance += (self.desired_distance - self.pose.distance) * t;
        }
        self.pose.distance = self.pose.distance.max(self.config.zoom.min_distance);
    }

    /// Publishes this frame's transform. A pose that went non-finite during
    /// the frame is rolled back to `checkpoint`.
    fn publish(&mut self, checkpoint: CameraPose) -> CameraTransform {
        if !self.pose.is_finite() {
            warn!(pose = ?self.pose, "navigation pose became non-finite, restoring previous frame");
            self.pose = checkpoint;
            self.sync_targets();
        }
        let candidate = match self.state.mode() {
            NavMode::Rotating(OrbitDrag::PivotBypass { .. }) | NavMode::Interpolating(_) => self.camera,
            _ => self.pose.transform(),
        };
        self.camera = self.publisher.publish(candidate);
        self.camera
    }

    /// Republishes after an API call moved the pose outside the frame loop.
    fn refresh(&mut self) {
        self.cache.invalidate();
        if !matches!(
            self.state.mode(),
            NavMode::Rotating(OrbitDrag::PivotBypass { .. }) | NavMode::Interpolating(_)
        ) {
            self.camera = self.publisher.publish(self.pose.transform());
        }
    }

    // ------------------------------------------------------------------
    // Mode plumbing
    // ------------------------------------------------------------------

    fn enter(&mut self, next: NavMode) -> Result<NavMode, NavError> {
        let from = self.state.kind();
        let to = next.kind();
        let previous = self.state.transition(next)?;
        if from != to {
            self.observers.emit(NavEvent::ModeChanged { from, to });
        }
        Ok(previous)
    }

    fn sync_targets(&mut self) {
        self.anchor_target = self.pose.anchor;
        self.desired_rotation = self.pose.rotation;
        self.desired_distance = self.pose.distance;
    }

    fn assign_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.sync_targets();
        self.refresh();
    }

    /// Leaves whatever mode is active and returns to idle, keeping the camera
    /// where it is. Following ends without anchor recovery.
    fn settle(&mut self) {
        match self.state.kind() {
            NavModeKind::Idle => {}
            NavModeKind::Rotating => self.end_rotation(),
            NavModeKind::Panning => {
                let _ = self.enter(NavMode::Idle);
            }
            NavModeKind::Following => {
                if self.follow_state().is_some_and(FollowState::is_orbiting) {
                    self.observers.emit(NavEvent::FollowOrbit { active: false });
                }
                self.sync_targets();
                let _ = self.enter(NavMode::Idle);
            }
            NavModeKind::Interpolating => {
                self.pose.rotation = self.camera.rotation;
                self.pose.anchor = self.pose.anchor_for_position(self.camera.position);
                self.sync_targets();
                let _ = self.enter(NavMode::Idle);
            }
        }
    }

    fn follow_state(&self) -> Option<&FollowState> {
        match self.state.mode() {
            NavMode::Following(follow) => Some(follow),
            _ => None,
        }
    }

    fn auto_distance(&self, entity: EntityId, scene: &dyn SceneQuery) -> f32 {
        optimal_distance(
            scene.world_bounds(entity),
            self.lens.fov_y_deg,
            self.config.follow.screen_fraction,
            self.config.follow.fallback_distance,
            self.config.zoom.min_distance,
            self.config.zoom.max_distance,
        )
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.config.zoom.min_distance, self.config.zoom.max_distance)
    }

    // ------------------------------------------------------------------
    // Programmatic API
    // ------------------------------------------------------------------

    /// Moves the camera to `anchor`, `distance` and `rotation`.
    ///
    /// Any active drag, follow, or interpolation ends first. With
    /// `interpolate` (and interpolation enabled) the camera glides there;
    /// otherwise the pose is assigned at once. Non-finite input is ignored.
    pub fn set_pose(&mut self, anchor: Vec3, distance: f32, rotation: Quat, interpolate: bool) {
        if !anchor.is_finite()
            || !distance.is_finite()
            || !rotation.is_finite()
            || rotation.length_squared() < 1e-12
        {
            warn!(?anchor, distance, ?rotation, "set_pose ignored: non-finite input");
            return;
        }
        let rotation = if rotation.is_normalized() {
            rotation
        } else {
            rotation.normalize()
        };
        self.settle();
        let destination = CameraPose {
            anchor,
            rotation,
            distance: self.clamp_distance(distance),
            offset: self.pose.offset,
        };

        if interpolate && self.config.interpolation.enabled {
            let request = InterpolationRequest::new(destination, self.config.interpolation.speed);
            if self.enter(NavMode::Interpolating(request)).is_ok() {
                debug!(?anchor, distance = destination.distance, "interpolation started");
            }
        } else {
            self.assign_pose(destination);
        }
    }

    /// Points the camera along `(pitch, yaw, roll)` in degrees, keeping the
    /// anchor. Ends a rotation drag or interpolation first.
    pub fn set_view_direction(&mut self, angles_deg: Vec3) {
        if !angles_deg.is_finite() {
            warn!(?angles_deg, "set_view_direction ignored: non-finite angles");
            return;
        }
        if matches!(self.state.kind(), NavModeKind::Rotating | NavModeKind::Interpolating) {
            self.settle();
        }
        let rotation = angles_to_rotation(angles_deg);
        self.pose.rotation = rotation;
        self.desired_rotation = rotation;
        if let NavMode::Following(follow) = self.state.mode_mut()
            && let Some(angles) = follow.orbit.as_mut()
        {
            *angles = OrbitAngles::from_rotation(rotation);
        }
        self.refresh();
    }

    /// Frames the whole scene: glides to the centre of
    /// [`SceneQuery::scene_bounds`] at a distance that fits it, keeping the
    /// view direction. An orthographic lens is resized to fit as well.
    ///
    /// Not available while following.
    pub fn reset_view(&mut self, scene: &dyn SceneQuery) -> Result<(), NavError> {
        if let Some(entity) = self.followed_entity() {
            warn!(%entity, "reset_view ignored while following");
            return Err(NavError::Following(entity));
        }
        let Some((bounds, distance)) = scene
            .scene_bounds()
            .and_then(|bounds| self.lens.fit_distance(&bounds).map(|d| (bounds, d)))
        else {
            warn!("reset_view: scene has no bounds");
            return Err(NavError::EmptyScene);
        };
        if self.lens.is_orthographic() {
            self.lens.ortho_size = Some(bounds.max_extent() * 0.75);
        }
        let rotation = self.desired_rotation;
        info!(center = ?bounds.center(), distance, "framing scene");
        self.set_pose(bounds.center(), distance, rotation, true);
        Ok(())
    }

    /// Blocks or unblocks user rotation (mouse and one-finger touch). With
    /// `only_left_button` only the left-button binding is affected: rotation
    /// stays available when it is bound to the right button, and a full
    /// block is lifted.
    ///
    /// Blocking ends an active rotation drag or follow orbit.
    pub fn block_rotation(&mut self, block: bool, only_left_button: bool) {
        if only_left_button {
            self.left_rotation_blocked = block;
            self.rotation_blocked = false;
        } else {
            self.rotation_blocked = block;
        }
        debug!(block, only_left_button, "rotation block changed");
        if self.user_rotation_blocked() && self.is_rotating() {
            self.end_rotation();
            self.refresh();
        }
    }

    /// Frames `entity`: glides to it at `distance` (or a distance that fits
    /// its bounds on screen) looking along `view_angles` (or the current
    /// direction).
    pub fn focus_on_object(
        &mut self,
        entity: EntityId,
        distance: Option<f32>,
        view_angles: Option<Vec3>,
        scene: &dyn SceneQuery,
    ) -> Result<(), NavError> {
        let Some(position) = scene.position(entity).filter(|p| p.is_finite()) else {
            warn!(%entity, "focus_on_object: entity not found");
            return Err(NavError::InvalidTarget(entity));
        };
        if self.is_following() {
            self.stop_following(scene);
        }
        let distance = distance
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or_else(|| self.auto_distance(entity, scene));
        let rotation = match view_angles {
            Some(angles) if angles.is_finite() => angles_to_rotation(angles),
            _ => look_rotation(self.camera.forward(), Vec3::Y).unwrap_or(self.pose.rotation),
        };
        info!(%entity, distance, "focusing entity");
        self.set_pose(position, distance, rotation, true);
        Ok(())
    }

    /// Starts tracking `entity`, or retargets an active follow.
    pub fn start_following(
        &mut self,
        entity: EntityId,
        params: FollowParams,
        scene: &dyn SceneQuery,
    ) -> Result<(), NavError> {
        let Some(position) = scene.position(entity).filter(|p| p.is_finite()) else {
            warn!(%entity, "start_following: entity not found");
            return Err(NavError::InvalidTarget(entity));
        };

        match self.follow_state().map(FollowState::is_orbiting) {
            Some(true) => self.observers.emit(NavEvent::FollowOrbit { active: false }),
            Some(false) => {}
            None => self.settle(),
        }

        let distance = params
            .distance
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| self.clamp_distance(d))
            .unwrap_or_else(|| self.auto_distance(entity, scene));
        let rotation = params
            .view_angles
            .filter(|a| a.is_finite())
            .map(angles_to_rotation)
            .or_else(|| look_rotation(position - self.camera.position, Vec3::Y))
            .unwrap_or(self.pose.rotation);
        let target = FollowTarget {
            anchor: position,
            rotation,
            distance,
        };

        self.enter(NavMode::Following(FollowState::new(entity, &params, target)))?;
        if !params.smooth_start {
            self.pose = CameraPose::new(position, rotation, distance);
        }
        self.sync_targets();
        self.desired_distance = distance;
        self.refresh();
        info!(%entity, distance, smooth_start = params.smooth_start, "following entity");
        Ok(())
    }

    /// Ends follow mode without moving the camera. No-op when not following.
    ///
    /// The new anchor is the entity if it still exists, else whatever the
    /// view centre hits in the scene, else the ground plane, else a point
    /// straight ahead at the current distance.
    pub fn stop_following(&mut self, scene: &dyn SceneQuery) {
        let Some((entity, orbiting)) = self.follow_state().map(|f| (f.entity, f.is_orbiting())) else {
            return;
        };
        let camera = if self.pose.is_finite() {
            self.pose.transform()
        } else {
            self.camera
        };

        let mut distance = self.pose.distance;
        let (anchor, source) = if let Some(position) = scene.position(entity).filter(|p| p.is_finite()) {
            (position, "entity")
        } else {
            let ray = self.lens.center_ray(&camera);
            if let Some(hit) = scene.raycast(&ray) {
                distance = camera.position.distance(hit.point);
                (hit.point, "view centre")
            } else if let Some(point) = Plane::GROUND.raycast(&ray) {
                distance = camera.position.distance(point);
                (point, "ground plane")
            } else {
                (camera.position + camera.forward() * distance, "projected")
            }
        };

        self.pose.anchor = anchor;
        self.pose.rotation = camera.rotation;
        self.pose.distance = self.clamp_distance(distance);
        self.pose.offset = self.pose.offset_for_position(camera.position);
        self.sync_targets();

        if orbiting {
            self.observers.emit(NavEvent::FollowOrbit { active: false });
        }
        let _ = self.enter(NavMode::Idle);
        self.refresh();
        info!(%entity, source, "follow mode stopped");
    }

    /// Snapshot of the current pose under `name`.
    pub fn capture_viewpoint(&self, name: impl Into<String>) -> Viewpoint {
        Viewpoint {
            name: name.into(),
            anchor: self.pose.anchor.to_array(),
            distance: self.pose.distance,
            angles_deg: rotation_to_angles(self.pose.rotation).to_array(),
        }
    }

    /// Glides back to a captured viewpoint.
    pub fn recall_viewpoint(&mut self, viewpoint: &Viewpoint) {
        debug!(name = %viewpoint.name, "recalling viewpoint");
        self.set_pose(
            Vec3::from_array(viewpoint.anchor),
            viewpoint.distance,
            angles_to_rotation(Vec3::from_array(viewpoint.angles_deg)),
            true,
        );
    }

    pub fn set_lens(&mut self, lens: Lens) {
        if !lens.is_valid() {
            warn!(?lens, "set_lens ignored: invalid lens");
            return;
        }
        self.lens = lens;
        self.cache.invalidate();
    }

    /// Viewport resize; a zero-sized viewport (minimised window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring empty viewport");
            return;
        }
        self.lens.width = width as f32;
        self.lens.height = height as f32;
        self.cache.invalidate();
    }

    pub fn set_distance_limits(&mut self, min: f32, max: f32) -> Result<(), NavError> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            warn!(min, max, "set_distance_limits ignored");
            return Err(ConfigError::Invalid {
                field: "zoom.min_distance",
                reason: format!("limits [{min}, {max}] are not 0 < min <= max"),
            }
            .into());
        }
        self.config.zoom.min_distance = min;
        self.config.zoom.max_distance = max;
        self.pose.distance = self.clamp_distance(self.pose.distance);
        self.desired_distance = self.clamp_distance(self.desired_distance);
        self.refresh();
        Ok(())
    }

    /// Swaps in a new configuration after validating it.
    pub fn apply_config(&mut self, config: Config) -> Result<(), NavError> {
        if let Err(err) = config.validate() {
            warn!(%err, "configuration rejected");
            return Err(err.into());
        }
        self.lens = Lens::from_config(&config.lens);
        self.config = config;
        self.pose.distance = self.clamp_distance(self.pose.distance);
        self.desired_distance = self.clamp_distance(self.desired_distance);
        self.refresh();
        info!("configuration applied");
        Ok(())
    }

    /// Follow options seeded from the configured defaults.
    pub fn default_follow_params(&self) -> FollowParams {
        FollowParams {
            lerp_speed: self.config.follow.lerp_speed,
            ..FollowParams::default()
        }
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.observers.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn mode(&self) -> NavModeKind {
        self.state.kind()
    }

    pub fn nav_mode(&self) -> &NavMode {
        self.state.mode()
    }

    pub fn is_following(&self) -> bool {
        self.state.kind() == NavModeKind::Following
    }

    pub fn followed_entity(&self) -> Option<EntityId> {
        self.follow_state().map(|f| f.entity)
    }

    /// True during a rotation drag or while orbiting a followed entity.
    pub fn is_rotating(&self) -> bool {
        match self.state.mode() {
            NavMode::Rotating(_) => true,
            NavMode::Following(follow) => follow.is_orbiting(),
            _ => false,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.state.kind() == NavModeKind::Panning
    }

    pub fn is_interpolating(&self) -> bool {
        self.state.kind() == NavModeKind::Interpolating
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    /// Last published transform.
    pub fn transform(&self) -> CameraTransform {
        self.camera
    }

    pub fn anchor(&self) -> Vec3 {
        self.pose.anchor
    }

    pub fn desired_distance(&self) -> f32 {
        self.desired_distance
    }

    pub fn lens(&self) -> &Lens {
        &self.lens
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
