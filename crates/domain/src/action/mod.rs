//! Authorize action record and its transitions.

mod object;
mod status;

pub use object::{ActionResult, AuthorizeKind, AuthorizeObject, PendingLedgerTransaction};
pub use status::ActionStatus;

use chrono::{DateTime, Utc};
use common::{ActionId, TransactionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::party::Party;
use crate::transaction::TransactionType;

/// Errors raised by illegal action transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: ActionStatus,
        action: &'static str,
    },
}

/// Action type. Only authorize actions exist in this workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActionType {
    #[default]
    AuthorizeAction,
}

/// Weak back-reference to the owning business transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPurpose {
    pub type_of: TransactionType,
    pub id: TransactionId,
}

/// Sanitized projection of a failure, stored on given-up actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub name: String,
    pub message: String,
}

impl ErrorSummary {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<&DomainError> for ErrorSummary {
    fn from(err: &DomainError) -> Self {
        Self::new(err.name(), err.to_string())
    }
}

/// Attributes needed to start an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAttributes {
    pub agent: Party,
    pub recipient: Party,
    pub object: AuthorizeObject,
    pub purpose: ActionPurpose,
}

/// One authorization attempt against a remote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub type_of: ActionType,
    pub status: ActionStatus,
    pub agent: Party,
    pub recipient: Party,
    pub object: AuthorizeObject,
    pub purpose: ActionPurpose,
    pub result: Option<ActionResult>,
    pub error: Option<ErrorSummary>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Action {
    /// Creates a new action in `Started` status.
    pub fn start(attributes: ActionAttributes, now: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::new(),
            type_of: ActionType::AuthorizeAction,
            status: ActionStatus::Started,
            agent: attributes.agent,
            recipient: attributes.recipient,
            object: attributes.object,
            purpose: attributes.purpose,
            result: None,
            error: None,
            start_date: now,
            end_date: None,
        }
    }

    pub fn kind(&self) -> AuthorizeKind {
        self.object.kind()
    }

    /// `Started` → `Completed`.
    pub fn complete(&mut self, result: ActionResult, now: DateTime<Utc>) -> Result<(), ActionError> {
        self.ensure(self.status.can_finish(), "complete")?;
        self.status = ActionStatus::Completed;
        self.result = Some(result);
        self.end_date = Some(now);
        Ok(())
    }

    /// `Started` → `FailedGiveUp`.
    pub fn give_up(&mut self, error: ErrorSummary, now: DateTime<Utc>) -> Result<(), ActionError> {
        self.ensure(self.status.can_finish(), "give up")?;
        self.status = ActionStatus::FailedGiveUp;
        self.error = Some(error);
        self.end_date = Some(now);
        Ok(())
    }

    /// `Completed` → `Canceled`. The result is kept for compensation.
    pub fn cancel(&mut self) -> Result<(), ActionError> {
        self.ensure(self.status.can_cancel(), "cancel")?;
        self.status = ActionStatus::Canceled;
        Ok(())
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), ActionError> {
        if allowed {
            Ok(())
        } else {
            Err(ActionError::InvalidStateTransition {
                current_status: self.status,
                action,
            })
        }
    }
}
