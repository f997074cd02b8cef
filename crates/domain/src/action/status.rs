//! Authorize action state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The status of an authorize action in its lifecycle.
///
/// State transitions:
/// ```text
/// Started ──┬──► Completed ──► Canceled
///           └──► FailedGiveUp
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Intent recorded, remote hold not yet confirmed.
    Started,

    /// Remote hold placed and recorded in the action result.
    Completed,

    /// Remote hold could not be placed (terminal state).
    FailedGiveUp,

    /// Remote hold compensated (terminal state).
    Canceled,
}

impl ActionStatus {
    /// Returns true if the action can be completed or given up.
    pub fn can_finish(&self) -> bool {
        matches!(self, ActionStatus::Started)
    }

    /// Returns true if the action can be canceled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, ActionStatus::Completed)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::FailedGiveUp | ActionStatus::Canceled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Started => "Started",
            ActionStatus::Completed => "Completed",
            ActionStatus::FailedGiveUp => "FailedGiveUp",
            ActionStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Started" => Ok(ActionStatus::Started),
            "Completed" => Ok(ActionStatus::Completed),
            "FailedGiveUp" => Ok(ActionStatus::FailedGiveUp),
            "Canceled" => Ok(ActionStatus::Canceled),
            other => Err(format!("unknown action status: {other}")),
        }
    }
}
