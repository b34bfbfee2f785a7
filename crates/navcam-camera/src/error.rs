//! Errors returned by the navigation API.

use crate::scene::EntityId;
use crate::state::NavModeKind;

/// Reasons an API call on the controller was rejected.
///
/// A rejected call has already been logged and has not mutated any state.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The entity does not exist in the scene.
    #[error("entity {0} is not a valid target")]
    InvalidTarget(EntityId),

    /// The call is not available while an entity is being followed.
    #[error("not available while following entity {0}")]
    Following(EntityId),

    /// The scene reported no bounds to frame.
    #[error("scene has no bounds to frame")]
    EmptyScene,

    /// The state machine refused a mode change.
    #[error("illegal navigation transition {from:?} -> {to:?}")]
    IllegalTransition { from: NavModeKind, to: NavModeKind },

    /// A configuration passed to the controller failed validation.
    #[error(transparent)]
    Config(#[from] navcam_config::ConfigError),
}
