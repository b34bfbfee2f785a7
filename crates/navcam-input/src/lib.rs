//! Input abstraction: mouse, touch, keyboard, and 6-DoF controller events normalized into
//! a single per-frame [`InputFrame`] consumed by the navigation controller.

pub mod frame;
pub mod sampler;

pub use frame::{
    ButtonState, InputFrame, Modifiers, NavKey, NavKeys, PointerButton, SpatialInput, ViewPreset,
};
pub use sampler::InputSampler;
