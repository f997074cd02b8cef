//! Domain error taxonomy.
//!
//! Callers of the authorization workflow only ever observe these kinds.
//! Remote failures are translated into them before they leave the saga.

use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The request is malformed or unsupported.
    #[error("Argument error ({argument}): {message}")]
    Argument { argument: String, message: String },

    /// The caller could not be authenticated by a remote service.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A precondition or ownership check failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A transaction, action or configuration entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A remote service is throttling requests.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// A remote service is down or answered unexpectedly.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl DomainError {
    /// Creates an argument error for the given argument.
    pub fn argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Argument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error for the given entity name.
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Returns the stable name of the error kind.
    pub fn name(&self) -> &'static str {
        match self {
            DomainError::Argument { .. } => "ArgumentError",
            DomainError::Unauthorized(_) => "UnauthorizedError",
            DomainError::Forbidden(_) => "ForbiddenError",
            DomainError::NotFound(_) => "NotFoundError",
            DomainError::RateLimitExceeded(_) => "RateLimitExceededError",
            DomainError::ServiceUnavailable(_) => "ServiceUnavailableError",
        }
    }
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_stable() {
        assert_eq!(DomainError::argument("x", "y").name(), "ArgumentError");
        assert_eq!(
            DomainError::Unauthorized(String::new()).name(),
            "UnauthorizedError"
        );
        assert_eq!(DomainError::Forbidden(String::new()).name(), "ForbiddenError");
        assert_eq!(DomainError::not_found("Action").name(), "NotFoundError");
        assert_eq!(
            DomainError::RateLimitExceeded(String::new()).name(),
            "RateLimitExceededError"
        );
        assert_eq!(
            DomainError::ServiceUnavailable(String::new()).name(),
            "ServiceUnavailableError"
        );
    }

    #[test]
    fn test_argument_display_includes_argument_name() {
        let err = DomainError::argument("point-ledger", "amount must be positive");
        assert_eq!(
            err.to_string(),
            "Argument error (point-ledger): amount must be positive"
        );
    }
}
