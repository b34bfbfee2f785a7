//! The per-frame input snapshot.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pointer buttons the navigation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

impl PointerButton {
    /// Slot of this button in [`InputFrame::buttons`].
    pub fn index(self) -> usize {
        match self {
            PointerButton::Left => 0,
            PointerButton::Right => 1,
            PointerButton::Middle => 2,
        }
    }
}

/// Held state plus edges for one button within one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Button is down at the end of the frame.
    pub held: bool,
    /// Went down during the frame.
    pub pressed: bool,
    /// Went up during the frame.
    pub released: bool,
}

/// Keyboard modifiers relevant to navigation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Fine control (shift): scales rotation and zoom deltas down.
    pub fine: bool,
    /// Turns a pan-button drag into a zoom drag (ctrl).
    pub zoom: bool,
}

/// Arrow keys used for keyboard travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
}

/// Which arrow keys are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl NavKeys {
    pub fn set(&mut self, key: NavKey, held: bool) {
        match key {
            NavKey::Up => self.up = held,
            NavKey::Down => self.down = held,
            NavKey::Left => self.left = held,
            NavKey::Right => self.right = held,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Held keys as `(right, up)` in `-1..=1`; opposite keys cancel.
    pub fn axes(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(i8::from(pos) - i8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up))
    }
}

/// Canned view directions, usually bound to hotkeys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewPreset {
    /// Looking straight down.
    Top,
    /// Looking along -Z.
    Front,
    /// Looking along +Z.
    Back,
    /// Looking along +X, from the left of the scene.
    Left,
    /// Looking along -X, from the right of the scene.
    Right,
}

impl ViewPreset {
    /// View direction as `(pitch, yaw, roll)` in degrees.
    pub fn angles_deg(self) -> Vec3 {
        match self {
            ViewPreset::Top => Vec3::new(-90.0, 0.0, 0.0),
            ViewPreset::Front => Vec3::ZERO,
            ViewPreset::Back => Vec3::new(0.0, 180.0, 0.0),
            ViewPreset::Left => Vec3::new(0.0, -90.0, 0.0),
            ViewPreset::Right => Vec3::new(0.0, 90.0, 0.0),
        }
    }
}

/// 6-DoF controller (space mouse) deltas for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpatialInput {
    /// Camera-space translation.
    pub translation: Vec3,
    /// Rotation deltas in degrees as `(pitch, yaw, roll)`.
    pub rotation: Vec3,
}

impl SpatialInput {
    /// True if the controller is at rest.
    pub fn is_zero(&self) -> bool {
        self.translation == Vec3::ZERO && self.rotation == Vec3::ZERO
    }
}

/// Everything the controller needs from the input devices for one frame.
///
/// Screen-space quantities are in physical pixels with `y` growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Pointer (or touch centroid) position at the end of the frame.
    pub pointer: Vec2,
    /// Mouse movement during the frame.
    pub mouse_delta: Vec2,
    /// Scroll wheel in lines; positive scrolls up (zooms in).
    pub scroll_delta: f32,
    /// Left, right, and middle button state, indexed by
    /// [`PointerButton::index`]. Prefer [`button`](Self::button) for reads.
    pub buttons: [ButtonState; 3],
    /// Single-finger touch movement during the frame.
    pub touch_delta: Vec2,
    /// Change of the two-finger spread in pixels; positive spreads (zooms in).
    pub pinch_delta: f32,
    /// Two or more fingers are down.
    pub is_two_finger: bool,
    /// At least one finger is down.
    pub touching: bool,
    /// A touch started during the frame.
    pub touch_began: bool,
    /// The last finger lifted during the frame.
    pub touch_ended: bool,
    pub modifiers: Modifiers,
    pub spatial: SpatialInput,
    /// Arrow keys held at the end of the frame.
    pub keys: NavKeys,
    /// A view preset hotkey went down during the frame.
    pub view_preset: Option<ViewPreset>,
    /// The reset-view hotkey went down during the frame.
    pub reset_view: bool,
}

impl InputFrame {
    /// State of one pointer button.
    #[must_use]
    pub fn button(&self, button: PointerButton) -> ButtonState {
        self.buttons[button.index()]
    }

    /// Mutable access, used by the sampler and by scripted input.
    pub fn button_mut(&mut self, button: PointerButton) -> &mut ButtonState {
        &mut self.buttons[button.index()]
    }

    /// Frame with `button` pressed this frame and held.
    #[must_use]
    pub fn with_press(mut self, button: PointerButton) -> Self {
        *self.button_mut(button) = ButtonState {
            held: true,
            pressed: true,
            released: false,
        };
        self
    }

    /// Frame with `button` held from an earlier frame.
    #[must_use]
    pub fn with_held(mut self, button: PointerButton) -> Self {
        *self.button_mut(button) = ButtonState {
            held: true,
            pressed: false,
            released: false,
        };
        self
    }

    /// Frame with `button` released this frame.
    #[must_use]
    pub fn with_release(mut self, button: PointerButton) -> Self {
        *self.button_mut(button) = ButtonState {
            held: false,
            pressed: false,
            released: true,
        };
        self
    }

    /// True if any pointer button went down, or a touch began.
    #[must_use]
    pub fn any_pressed(&self) -> bool {
        self.buttons.iter().any(|b| b.pressed) || self.touch_began
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_is_idle() {
        let frame = InputFrame::default();
        assert!(!frame.any_pressed());
        assert!(!frame.button(PointerButton::Left).held);
        assert!(frame.spatial.is_zero());
    }

    #[test]
    fn test_press_sets_held_and_edge() {
        let frame = InputFrame::default().with_press(PointerButton::Right);
        let right = frame.button(PointerButton::Right);
        assert!(right.held && right.pressed && !right.released);
        assert!(frame.any_pressed());
        assert!(!frame.button(PointerButton::Left).held);
    }

    #[test]
    fn test_release_clears_held() {
        let frame = InputFrame::default().with_release(PointerButton::Middle);
        let middle = frame.button(PointerButton::Middle);
        assert!(!middle.held && middle.released);
        assert!(!frame.any_pressed());
    }

    #[test]
    fn test_buttons_field_matches_accessor() {
        let mut frame = InputFrame {
            scroll_delta: 1.0,
            ..Default::default()
        };
        frame.buttons[PointerButton::Middle.index()].held = true;
        assert!(frame.button(PointerButton::Middle).held);
        assert!(!frame.button(PointerButton::Right).held);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut keys = NavKeys::default();
        assert!(!keys.any());
        keys.set(NavKey::Up, true);
        keys.set(NavKey::Right, true);
        assert_eq!(keys.axes(), Vec2::new(1.0, 1.0));
        keys.set(NavKey::Down, true);
        keys.set(NavKey::Left, true);
        assert_eq!(keys.axes(), Vec2::ZERO);
        assert!(keys.any());
    }

    #[test]
    fn test_presets_are_distinct_directions() {
        let presets = [
            ViewPreset::Top,
            ViewPreset::Front,
            ViewPreset::Back,
            ViewPreset::Left,
            ViewPreset::Right,
        ];
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.angles_deg(), b.angles_deg(), "{a:?} == {b:?}");
            }
        }
    }

    #[test]
    fn test_touch_begin_counts_as_press() {
        let frame = InputFrame {
            touch_began: true,
            touching: true,
            ..Default::default()
        };
        assert!(frame.any_pressed());
    }
}
