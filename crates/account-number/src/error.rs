use chrono::{DateTime, Utc};
use domain::DomainError;
use thiserror::Error;

/// Errors raised while issuing or parsing account numbers.
#[derive(Debug, Error)]
pub enum AccountNumberError {
    /// The counter store answered with something that is not a usable sequence.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The counter store could not be reached.
    #[error("Counter store error: {0}")]
    Counter(#[from] redis::RedisError),

    /// A source must be exactly 10 ASCII digits.
    #[error("Invalid source {0:?}: expected 10 digits")]
    InvalidSource(String),

    /// The string is not a well-formed account number or its check digit does not match.
    #[error("Invalid account number {0:?}")]
    InvalidAccountNumber(String),

    /// The day of the open date is over, so its counter no longer exists.
    #[error("Open date {0} is older than its daily counter")]
    ExpiredOpenDate(DateTime<Utc>),
}

impl From<AccountNumberError> for DomainError {
    fn from(err: AccountNumberError) -> Self {
        match err {
            AccountNumberError::InvalidSource(_) | AccountNumberError::InvalidAccountNumber(_) => {
                DomainError::argument("accountNumber", err.to_string())
            }
            AccountNumberError::ExpiredOpenDate(_) => {
                DomainError::argument("openDate", err.to_string())
            }
            other => DomainError::ServiceUnavailable(other.to_string()),
        }
    }
}

/// Result type for account number operations.
pub type Result<T> = std::result::Result<T, AccountNumberError>;
