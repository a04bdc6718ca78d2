//! Controller lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one controller version
///
/// ```text
/// installing -> installed -> activating -> activated
///      |             |            |            |
///      v             +------------+------------+--> redundant
/// install-failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerState {
    /// Precache in progress
    Installing,
    /// Installed and waiting to activate
    Installed,
    /// Evicting stale partitions
    Activating,
    /// Intercepting fetches
    Activated,
    /// Install failed; this version never serves
    InstallFailed,
    /// Superseded by a newer version
    Redundant,
}

impl ControllerState {
    /// Whether moving to `next` is a valid lifecycle step
    pub fn can_transition_to(&self, next: ControllerState) -> bool {
        use ControllerState::*;
        matches!(
            (self, next),
            (Installing, Installed)
                | (Installing, InstallFailed)
                | (Installed, Activating)
                | (Installed, Redundant)
                | (Activating, Activated)
                | (Activating, Redundant)
                | (Activated, Redundant)
        )
    }

    /// Only an activated controller intercepts fetches
    pub fn intercepts_fetches(&self) -> bool {
        matches!(self, Self::Activated)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InstallFailed | Self::Redundant)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::InstallFailed => write!(f, "install-failed"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}
