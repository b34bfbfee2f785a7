//! Navigation state machine.
//!
//! Exactly one mode is active at a time. Every mode change goes through
//! [`NavStateMachine::transition`], which consults a fixed transition table and
//! refuses anything not listed there.

use tracing::{debug, warn};

use crate::error::NavError;
use crate::follow::FollowState;
use crate::interpolator::InterpolationRequest;
use crate::orbit::OrbitDrag;
use crate::pan::PanDrag;

/// Discriminant of [`NavMode`], used for events and the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavModeKind {
    Idle,
    Rotating,
    Panning,
    Following,
    Interpolating,
}

impl NavModeKind {
    /// Whether `self -> next` is a legal mode change.
    ///
    /// Re-entering `Following` retargets the follow; re-entering
    /// `Interpolating` replaces the destination.
    pub fn can_transition(self, next: NavModeKind) -> bool {
        use NavModeKind::*;
        matches!(
            (self, next),
            (Idle, _)
                | (Rotating, Idle | Following | Interpolating)
                | (Panning, Idle | Following | Interpolating)
                | (Following, Idle | Following)
                | (Interpolating, Idle | Following | Interpolating)
        )
    }
}

/// Current mode together with its mode-specific state.
#[derive(Clone, Debug, Default)]
pub enum NavMode {
    #[default]
    Idle,
    Rotating(OrbitDrag),
    Panning(PanDrag),
    Following(FollowState),
    Interpolating(InterpolationRequest),
}

impl NavMode {
    pub fn kind(&self) -> NavModeKind {
        match self {
            NavMode::Idle => NavModeKind::Idle,
            NavMode::Rotating(_) => NavModeKind::Rotating,
            NavMode::Panning(_) => NavModeKind::Panning,
            NavMode::Following(_) => NavModeKind::Following,
            NavMode::Interpolating(_) => NavModeKind::Interpolating,
        }
    }
}

#[derive(Debug, Default)]
pub struct NavStateMachine {
    mode: NavMode,
}

impl NavStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> NavModeKind {
        self.mode.kind()
    }

    pub fn mode(&self) -> &NavMode {
        &self.mode
    }

    pub fn mode_mut(&mut self) -> &mut NavMode {
        &mut self.mode
    }

    /// Switches to `next` and returns the mode that was left.
    ///
    /// Illegal transitions are logged and leave the current mode untouched.
    pub fn transition(&mut self, next: NavMode) -> Result<NavMode, NavError> {
        let from = self.kind();
        let to = next.kind();
        if !from.can_transition(to) {
            warn!(?from, ?to, "illegal navigation transition refused");
            return Err(NavError::IllegalTransition { from, to });
        }
        debug!(?from, ?to, "navigation mode changed");
        Ok(std::mem::replace(&mut self.mode, next))
    }
}
