//! Resource lifecycle states and the control actions that move between them.
//!
//! ```text
//!   ┌──────────┐   start    ┌──────────┐  (remote)  ┌──────────┐
//!   │ Stopped  │──────────▶│ Starting │──────────▶│ Running  │
//!   └──────────┘            └──────────┘            └────┬─────┘
//!        ▲                                               │ stop
//!        │          (remote)  ┌──────────┐               │
//!        └────────────────────│ Stopping │◀──────────────┘
//!                             └──────────┘
//! ```
//!
//! `Starting` and `Stopping` are transitional: the server moves the resource
//! out of them on its own, and the client only learns about it by polling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of the remote VPN instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    /// The instance is not running.
    #[default]
    Stopped,
    /// A start was requested and the instance is booting.
    Starting,
    /// The instance is up.
    Running,
    /// A stop was requested and the instance is shutting down.
    Stopping,
}

impl ResourceState {
    /// All states, in declaration order.
    pub const ALL: [Self; 4] = [Self::Stopped, Self::Starting, Self::Running, Self::Stopping];

    /// Returns true for `Starting` and `Stopping`.
    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    /// Returns true for `Stopped` and `Running`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_transitional()
    }

    /// The action a toggle issues from this state.
    ///
    /// Only `Stopped` starts the instance; every other state stops it.
    #[must_use]
    pub const fn toggle_action(self) -> Action {
        match self {
            Self::Stopped => Action::Start,
            Self::Starting | Self::Running | Self::Stopping => Action::Stop,
        }
    }

    /// Lower-case wire name, as used in persisted snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display_text(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

impl FromStr for ResourceState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownState(s.to_string()))
    }
}

/// A state-changing request sent to the control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Start the instance.
    Start,
    /// Stop the instance.
    Stop,
}

impl Action {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(CoreError::UnknownAction(s.to_string())),
        }
    }
}
