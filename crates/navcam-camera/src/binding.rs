//! Level-triggered follow toggle for a single entity.

use tracing::debug;

use crate::controller::NavigationController;
use crate::error::NavError;
use crate::follow::FollowParams;
use crate::scene::{EntityId, SceneQuery};

/// Binds a boolean "follow this" signal (a UI toggle, a script flag) to the
/// controller's follow mode.
///
/// A rising edge starts following, a falling edge stops it. If following ends
/// some other way while the signal is still high (stop-on-click, another API
/// call), the binding treats it as a user stop and waits for the signal to be
/// re-asserted instead of restarting on the next sync.
#[derive(Clone, Debug)]
pub struct FollowBinding {
    pub target: EntityId,
    pub params: FollowParams,
    last_signal: bool,
    user_stopped: bool,
    engaged: bool,
}

impl FollowBinding {
    pub fn new(target: EntityId, params: FollowParams) -> Self {
        Self {
            target,
            params,
            last_signal: false,
            user_stopped: false,
            engaged: false,
        }
    }

    /// Whether the controller is following this binding's target.
    pub fn is_following(&self, nav: &NavigationController) -> bool {
        nav.followed_entity() == Some(self.target)
    }

    pub fn user_stopped(&self) -> bool {
        self.user_stopped
    }

    /// Call once per frame with the current signal level.
    pub fn sync(&mut self, signal: bool, nav: &mut NavigationController, scene: &dyn SceneQuery) {
        let rising = signal && !self.last_signal;
        let falling = !signal && self.last_signal;
        self.last_signal = signal;

        if self.engaged && !self.is_following(nav) {
            self.engaged = false;
            if signal {
                self.user_stopped = true;
                debug!(entity = %self.target, "follow ended externally, waiting for signal reset");
            }
        }
        if rising {
            self.user_stopped = false;
        }

        if signal && !self.user_stopped && !self.is_following(nav) {
            // A target that cannot be followed is not retried every frame.
            if self.start(nav, scene).is_err() {
                self.user_stopped = true;
            }
        } else if falling && self.is_following(nav) {
            nav.stop_following(scene);
            self.engaged = false;
        }
    }

    pub fn start(
        &mut self,
        nav: &mut NavigationController,
        scene: &dyn SceneQuery,
    ) -> Result<(), NavError> {
        self.user_stopped = false;
        nav.start_following(self.target, self.params, scene)?;
        self.engaged = true;
        Ok(())
    }

    /// Stops following this target; other follows are left alone.
    pub fn stop(&mut self, nav: &mut NavigationController, scene: &dyn SceneQuery) {
        self.user_stopped = true;
        self.engaged = false;
        if self.is_following(nav) {
            nav.stop_following(scene);
        }
    }

    pub fn toggle(
        &mut self,
        nav: &mut NavigationController,
        scene: &dyn SceneQuery,
    ) -> Result<(), NavError> {
        if self.is_following(nav) {
            self.stop(nav, scene);
            Ok(())
        } else {
            self.start(nav, scene)
        }
    }

    /// One-shot framing of the target using the binding's distance and angles.
    pub fn focus(
        &self,
        nav: &mut NavigationController,
        scene: &dyn SceneQuery,
    ) -> Result<(), NavError> {
        nav.focus_on_object(self.target, self.params.distance, self.params.view_angles, scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestScene;
    use glam::Vec3;
    use navcam_config::Config;
    use navcam_input::{InputFrame, PointerButton};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (NavigationController, TestScene, FollowBinding) {
        let nav = NavigationController::new(Config::default()).unwrap();
        let scene = TestScene::new().with_entity(EntityId(7), Vec3::new(2.0, 0.0, -6.0), Vec3::ONE);
        let binding = FollowBinding::new(
            EntityId(7),
            FollowParams {
                stop_on_click: true,
                ..Default::default()
            },
        );
        (nav, scene, binding)
    }

    #[test]
    fn test_rising_edge_starts_and_falling_edge_stops() {
        let (mut nav, scene, mut binding) = setup();
        binding.sync(true, &mut nav, &scene);
        assert!(binding.is_following(&nav));
        binding.sync(true, &mut nav, &scene);
        assert!(binding.is_following(&nav));
        binding.sync(false, &mut nav, &scene);
        assert!(!nav.is_following());
    }

    #[test]
    fn test_external_stop_is_not_undone_while_signal_high() {
        let (mut nav, scene, mut binding) = setup();
        binding.sync(true, &mut nav, &scene);
        nav.update(&InputFrame::default().with_press(PointerButton::Left), &scene, DT);
        assert!(!nav.is_following());

        for _ in 0..5 {
            binding.sync(true, &mut nav, &scene);
            nav.update(&InputFrame::default(), &scene, DT);
        }
        assert!(!nav.is_following());
        assert!(binding.user_stopped());

        binding.sync(false, &mut nav, &scene);
        binding.sync(true, &mut nav, &scene);
        assert!(binding.is_following(&nav));
    }

    #[test]
    fn test_missing_target_is_not_retried() {
        let (mut nav, _, _) = setup();
        let scene = TestScene::new();
        let mut binding = FollowBinding::new(EntityId(99), FollowParams::default());
        binding.sync(true, &mut nav, &scene);
        assert!(!nav.is_following());
        assert!(binding.user_stopped());
    }

    #[test]
    fn test_toggle_and_stop_leave_other_follows_alone() {
        let (mut nav, scene, mut binding) = setup();
        binding.toggle(&mut nav, &scene).unwrap();
        assert!(binding.is_following(&nav));
        binding.toggle(&mut nav, &scene).unwrap();
        assert!(!nav.is_following());

        let scene = scene.with_entity(EntityId(8), Vec3::ZERO, Vec3::ONE);
        nav.start_following(EntityId(8), FollowParams::default(), &scene).unwrap();
        binding.stop(&mut nav, &scene);
        assert_eq!(nav.followed_entity(), Some(EntityId(8)));
    }
}
