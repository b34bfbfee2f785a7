//! Frame-coherent input accumulator.
//!
//! [`InputSampler`] collects platform events during a frame and hands the
//! controller one [`InputFrame`] snapshot.

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::frame::{
    ButtonState, InputFrame, Modifiers, NavKey, NavKeys, PointerButton, SpatialInput, ViewPreset,
};

/// Pixels of smooth-scroll travel that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Accumulates raw pointer, touch, and spatial events into an [`InputFrame`].
///
/// # Usage
///
/// 1. Forward platform events via the `on_*` methods during event collection.
/// 2. Take the snapshot with [`frame`](Self::frame) and feed it to the controller.
/// 3. Call [`clear_transients`](Self::clear_transients) at end of frame.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    pointer: Vec2,
    has_pointer: bool,
    mouse_delta: Vec2,
    scroll: f32,
    buttons: [ButtonState; 3],
    touch_delta: Vec2,
    touch_centroid: Option<Vec2>,
    touch_spread: Option<f32>,
    pinch: f32,
    fingers: u8,
    touch_began: bool,
    touch_ended: bool,
    modifiers: Modifiers,
    spatial: SpatialInput,
    keys: NavKeys,
    view_preset: Option<ViewPreset>,
    reset_view: bool,
}

impl InputSampler {
    /// Creates a sampler with everything zeroed/released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Cursor moved to an absolute pixel position.
    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        // The first event only establishes the position.
        if self.has_pointer {
            self.mouse_delta += new_pos - self.pointer;
        }
        self.pointer = new_pos;
        self.has_pointer = true;
    }

    /// Raw relative motion (e.g. while the cursor is captured).
    pub fn on_raw_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    /// Pointer button changed state.
    pub fn on_button(&mut self, button: PointerButton, pressed: bool) {
        let state = &mut self.buttons[button.index()];
        if pressed {
            state.held = true;
            state.pressed = true;
        } else {
            state.held = false;
            state.released = true;
        }
    }

    /// Wheel movement in lines (positive = up).
    pub fn on_scroll_lines(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Smooth-scroll movement in pixels (positive = up).
    pub fn on_scroll_pixels(&mut self, pixels: f32) {
        self.scroll += pixels / PIXELS_PER_LINE;
    }

    /// Modifier keys changed.
    pub fn on_modifiers(&mut self, fine: bool, zoom: bool) {
        self.modifiers = Modifiers { fine, zoom };
    }

    /// Arrow key changed state.
    pub fn on_key(&mut self, key: NavKey, pressed: bool) {
        self.keys.set(key, pressed);
    }

    /// View preset hotkey pressed. The last preset within a frame wins.
    pub fn on_view_preset(&mut self, preset: ViewPreset) {
        trace!(?preset, "view preset");
        self.view_preset = Some(preset);
    }

    /// Reset-view hotkey pressed.
    pub fn on_reset_view(&mut self) {
        self.reset_view = true;
    }

    /// Window lost focus: nothing stays held.
    pub fn on_focus_lost(&mut self) {
        self.keys = NavKeys::default();
        self.modifiers = Modifiers::default();
        for button in &mut self.buttons {
            if button.held {
                button.held = false;
                button.released = true;
            }
        }
    }

    /// A touch gesture started (or a finger was added) with the given centroid.
    pub fn on_touch_began(&mut self, fingers: u8, centroid: Vec2) {
        if self.fingers == 0 {
            self.touch_began = true;
            trace!(fingers, "touch began");
        }
        self.fingers = fingers.max(1);
        self.touch_centroid = Some(centroid);
        self.touch_spread = None;
        self.pointer = centroid;
        self.has_pointer = true;
    }

    /// Fingers moved. `spread` is the distance between the first two fingers.
    pub fn on_touch_moved(&mut self, fingers: u8, centroid: Vec2, spread: f32) {
        if let Some(last) = self.touch_centroid {
            self.touch_delta += centroid - last;
        }
        if fingers >= 2 {
            if let Some(last_spread) = self.touch_spread {
                self.pinch += spread - last_spread;
            }
            self.touch_spread = Some(spread);
        } else {
            self.touch_spread = None;
        }
        self.fingers = fingers.max(1);
        self.touch_centroid = Some(centroid);
        self.pointer = centroid;
    }

    /// Platform pinch gesture reported as a spread delta in pixels.
    pub fn on_pinch(&mut self, delta: f32) {
        self.pinch += delta;
    }

    /// All fingers lifted.
    pub fn on_touch_ended(&mut self) {
        if self.fingers > 0 {
            self.touch_ended = true;
            trace!("touch ended");
        }
        self.fingers = 0;
        self.touch_centroid = None;
        self.touch_spread = None;
    }

    /// 6-DoF controller sample. Accumulates within the frame.
    pub fn on_spatial(&mut self, translation: Vec3, rotation_deg: Vec3) {
        self.spatial.translation += translation;
        self.spatial.rotation += rotation_deg;
    }

    /// Clears per-frame transients: deltas, scroll, pinch, edges.
    pub fn clear_transients(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll = 0.0;
        self.touch_delta = Vec2::ZERO;
        self.pinch = 0.0;
        self.touch_began = false;
        self.touch_ended = false;
        self.spatial = SpatialInput::default();
        self.view_preset = None;
        self.reset_view = false;
        for b in &mut self.buttons {
            b.pressed = false;
            b.released = false;
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Snapshot of everything accumulated since the last clear.
    #[must_use]
    pub fn frame(&self) -> InputFrame {
        let mut frame = InputFrame {
            pointer: self.pointer,
            mouse_delta: self.mouse_delta,
            scroll_delta: self.scroll,
            touch_delta: self.touch_delta,
            pinch_delta: self.pinch,
            is_two_finger: self.fingers >= 2,
            touching: self.fingers > 0,
            touch_began: self.touch_began,
            touch_ended: self.touch_ended,
            modifiers: self.modifiers,
            spatial: self.spatial,
            keys: self.keys,
            view_preset: self.view_preset,
            reset_view: self.reset_view,
            ..Default::default()
        };
        for button in [PointerButton::Left, PointerButton::Right, PointerButton::Middle] {
            *frame.button_mut(button) = self.buttons[button.index()];
        }
        frame
    }

    /// Current pointer position in pixels.
    #[must_use]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }
}
