//! Remote ledger failures and their translation into the domain taxonomy.

use domain::{DomainError, ErrorSummary};
use thiserror::Error;

/// Name recorded on given-up actions for status-tagged remote failures.
pub const REMOTE_ERROR_NAME: &str = "LedgerRequestError";

/// Failure of a call against a remote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The remote service answered with an error status.
    #[error("{service} responded with status {status}: {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    /// A failure without a status tag; passes through translation unchanged.
    #[error(transparent)]
    Local(#[from] DomainError),
}

impl LedgerError {
    pub fn remote(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        LedgerError::Remote {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Sanitized `{name, message}` projection of this failure.
    pub fn summary(&self) -> ErrorSummary {
        match self {
            LedgerError::Remote { .. } => ErrorSummary::new(REMOTE_ERROR_NAME, self.to_string()),
            LedgerError::Local(err) => ErrorSummary::from(err),
        }
    }
}

/// Maps a remote failure onto the domain error kinds.
///
/// | status | kind |
/// |---|---|
/// | 400 | `Argument` tagged with the service name |
/// | 401 | `Unauthorized` |
/// | 403 | `Forbidden` |
/// | 404 | `NotFound` |
/// | 429 | `RateLimitExceeded` |
/// | other | `ServiceUnavailable` |
pub fn translate(err: LedgerError) -> DomainError {
    match err {
        LedgerError::Remote {
            service,
            status,
            message,
        } => match status {
            400 => DomainError::Argument {
                argument: service,
                message,
            },
            401 => DomainError::Unauthorized(message),
            403 => DomainError::Forbidden(message),
            404 => DomainError::NotFound(message),
            429 => DomainError::RateLimitExceeded(message),
            _ => DomainError::ServiceUnavailable(message),
        },
        LedgerError::Local(err) => err,
    }
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        translate(err)
    }
}
