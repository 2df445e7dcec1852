//! Session state machine types.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a capture session.
///
/// `NotStarted --reset--> Running --reset/step--> Running`, and
/// `close` moves either state to the terminal `Closed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Constructed, or the last reset failed. No resource is held.
    #[default]
    NotStarted,

    /// A capture resource is held and frames can be requested.
    Running,

    /// Terminal. No resource is held.
    Closed,
}

impl SessionState {
    /// Returns true if the session has not been started.
    pub fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Returns true if the session is running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if the session is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
