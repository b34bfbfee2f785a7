//! Scripted user sessions. Each step either synthesises platform events for a
//! number of frames or calls the controller API directly.

use glam::{Vec2, Vec3};
use navcam_camera::EntityId;
use navcam_input::{InputSampler, NavKey, PointerButton, ViewPreset};

use crate::scene::DRONE;

/// A multi-frame gesture, replayed as raw events into an [`InputSampler`].
#[derive(Clone, Copy, Debug)]
pub enum Gesture {
    /// Drag with the given button, moving the cursor by `step` each frame.
    Drag { button: PointerButton, step: Vec2 },
    /// Middle drag with the zoom modifier held.
    ZoomDrag { step: f32 },
    Scroll { lines_per_frame: f32 },
    Swipe { step: Vec2 },
    Pinch { spread_per_frame: f32 },
    Spatial { translation: Vec3, rotation: Vec3 },
    /// Hold an arrow key, optionally with the fine modifier.
    Key { key: NavKey, fine: bool },
}

impl Gesture {
    /// Feeds the events for frame `index` of `frames`.
    pub fn feed(&self, sampler: &mut InputSampler, index: u32, frames: u32) {
        let first = index == 0;
        let last = index + 1 == frames;
        let cursor = sampler.pointer();
        match *self {
            Gesture::Drag { button, step } => {
                if first {
                    sampler.on_button(button, true);
                }
                sampler.on_cursor_moved(cursor.x + step.x, cursor.y + step.y);
                if last {
                    sampler.on_button(button, false);
                }
            }
            Gesture::ZoomDrag { step } => {
                sampler.on_modifiers(false, true);
                if first {
                    sampler.on_button(PointerButton::Middle, true);
                }
                sampler.on_cursor_moved(cursor.x, cursor.y + step);
                if last {
                    sampler.on_button(PointerButton::Middle, false);
                    sampler.on_modifiers(false, false);
                }
            }
            Gesture::Scroll { lines_per_frame } => sampler.on_scroll_lines(lines_per_frame),
            Gesture::Swipe { step } => {
                if first {
                    sampler.on_touch_began(1, cursor);
                }
                sampler.on_touch_moved(1, cursor + step, 0.0);
                if last {
                    sampler.on_touch_ended();
                }
            }
            Gesture::Pinch { spread_per_frame } => {
                if first {
                    sampler.on_touch_began(2, cursor);
                }
                let spread = 200.0 + spread_per_frame * index as f32;
                sampler.on_touch_moved(2, cursor, spread);
                if last {
                    sampler.on_touch_ended();
                }
            }
            Gesture::Spatial { translation, rotation } => sampler.on_spatial(translation, rotation),
            Gesture::Key { key, fine } => {
                if first {
                    sampler.on_modifiers(fine, false);
                    sampler.on_key(key, true);
                }
                if last {
                    sampler.on_key(key, false);
                    sampler.on_modifiers(false, false);
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Step {
    Gesture { gesture: Gesture, frames: u32 },
    Idle { frames: u32 },
    Follow { entity: EntityId, allow_rotation: bool, stop_on_click: bool },
    Focus(EntityId),
    StopFollowing,
    Bookmark(&'static str),
    Recall(&'static str),
    DespawnDrone,
    Preset(ViewPreset),
    ResetView,
    BlockRotation(bool),
}

/// Scripted sessions selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Orbit, pan, and zoom with the mouse.
    Mouse,
    /// The same with touch gestures.
    Touch,
    /// Follow the drone, orbit it, then lose it.
    Follow,
    /// Frame crates and hop between bookmarks.
    Focus,
    /// View presets, arrow keys, scene reset, and a rotation block.
    Keyboard,
    /// Everything in sequence.
    Tour,
}

impl Scenario {
    /// Steps of the scenario; `frames` is the length of one gesture.
    pub fn steps(self, frames: u32) -> Vec<Step> {
        match self {
            Scenario::Mouse => mouse(frames),
            Scenario::Touch => touch(frames),
            Scenario::Follow => follow(frames),
            Scenario::Focus => focus(frames),
            Scenario::Keyboard => keyboard(frames),
            Scenario::Tour => [
                mouse(frames),
                touch(frames),
                keyboard(frames),
                focus(frames),
                follow(frames),
            ]
            .concat(),
        }
    }
}

fn gesture(gesture: Gesture, frames: u32) -> Step {
    Step::Gesture { gesture, frames }
}

fn mouse(frames: u32) -> Vec<Step> {
    vec![
        gesture(
            Gesture::Drag {
                button: PointerButton::Right,
                step: Vec2::new(4.0, 1.5),
            },
            frames,
        ),
        Step::Idle { frames: frames / 2 },
        gesture(
            Gesture::Drag {
                button: PointerButton::Middle,
                step: Vec2::new(-3.0, 0.0),
            },
            frames,
        ),
        gesture(Gesture::Scroll { lines_per_frame: 0.5 }, frames / 2),
        gesture(Gesture::ZoomDrag { step: 4.0 }, frames / 2),
        gesture(
            Gesture::Spatial {
                translation: Vec3::new(0.02, 0.0, 0.0),
                rotation: Vec3::new(0.0, 0.3, 0.0),
            },
            frames / 2,
        ),
        Step::Idle { frames },
    ]
}

fn touch(frames: u32) -> Vec<Step> {
    vec![
        gesture(Gesture::Swipe { step: Vec2::new(-5.0, 0.0) }, frames),
        gesture(Gesture::Pinch { spread_per_frame: 3.0 }, frames / 2),
        Step::Idle { frames },
    ]
}

fn follow(frames: u32) -> Vec<Step> {
    vec![
        Step::Follow {
            entity: DRONE,
            allow_rotation: true,
            stop_on_click: false,
        },
        Step::Idle { frames: frames * 2 },
        gesture(
            Gesture::Drag {
                button: PointerButton::Right,
                step: Vec2::new(3.0, 0.0),
            },
            frames,
        ),
        Step::Idle { frames },
        Step::DespawnDrone,
        Step::Idle { frames },
    ]
}

fn focus(frames: u32) -> Vec<Step> {
    vec![
        Step::Bookmark("start"),
        Step::Focus(EntityId(crate::scene::FIRST_CRATE)),
        Step::Idle { frames: frames * 2 },
        Step::Focus(EntityId(crate::scene::FIRST_CRATE + 1)),
        Step::Idle { frames: frames * 2 },
        Step::Recall("start"),
        Step::Idle { frames: frames * 2 },
        Step::Follow {
            entity: EntityId(crate::scene::FIRST_CRATE + 2),
            allow_rotation: false,
            stop_on_click: true,
        },
        Step::Idle { frames },
        gesture(
            Gesture::Drag {
                button: PointerButton::Left,
                step: Vec2::ZERO,
            },
            2,
        ),
        Step::StopFollowing,
    ]
}

fn keyboard(frames: u32) -> Vec<Step> {
    vec![
        Step::Preset(ViewPreset::Top),
        Step::Idle { frames: frames / 2 },
        gesture(
            Gesture::Key {
                key: NavKey::Up,
                fine: false,
            },
            frames,
        ),
        Step::Preset(ViewPreset::Front),
        gesture(
            Gesture::Key {
                key: NavKey::Up,
                fine: true,
            },
            frames / 2,
        ),
        Step::ResetView,
        Step::Idle { frames: frames * 2 },
        Step::BlockRotation(true),
        gesture(
            Gesture::Drag {
                button: PointerButton::Right,
                step: Vec2::new(4.0, 0.0),
            },
            frames / 2,
        ),
        Step::BlockRotation(false),
        Step::Idle { frames },
    ]
}
