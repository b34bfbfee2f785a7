//! Interactive camera navigation for 3D scenes.
//!
//! The [`NavigationController`] turns per-frame pointer, touch, keyboard, and
//! 6-DoF input into a camera transform. It orbits, pans, and zooms around an anchor
//! point, follows scene entities, and glides between poses. The host scene is
//! only ever seen through the [`SceneQuery`] trait.
//!
//! The camera pose is expressed relative to an anchor:
//!
//! ```text
//! position = anchor - (rotation * FORWARD * distance + offset)
//! ```
//!
//! Everything else (pivot-bypass orbit, follow recovery, interpolation) is a
//! way of moving that anchor, rotation, distance, or offset without making
//! the published transform jump.

mod binding;
mod cache;
mod controller;
mod error;
mod follow;
mod interpolator;
mod observer;
mod orbit;
mod pan;
mod pose;
mod scene;
mod state;

#[cfg(test)]
mod testing;

pub use binding::FollowBinding;
pub use cache::QueryCache;
pub use controller::NavigationController;
pub use error::NavError;
pub use follow::{FollowParams, FollowState, FollowTarget, optimal_distance};
pub use interpolator::InterpolationRequest;
pub use observer::{NavEvent, Observers, Subscription, SubscriptionId};
pub use orbit::{OrbitAngles, OrbitDrag, OrbitStyle, Pivot, PivotOrbit, PivotSource, select_pivot};
pub use pan::PanDrag;
pub use pose::{CameraPose, CameraTransform, PosePublisher};
pub use scene::{EmptyScene, EntityId, Lens, SceneQuery};
pub use state::{NavMode, NavModeKind, NavStateMachine};
