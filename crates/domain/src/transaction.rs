//! In-progress business transactions that own authorize actions.

use chrono::{DateTime, Utc};
use common::TransactionId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::party::Party;

/// Type of business transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionType {
    #[default]
    PlaceOrder,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::PlaceOrder => "PlaceOrder",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    InProgress,
    Confirmed,
    Expired,
    Canceled,
}

/// A place-order transaction.
///
/// Only `InProgress` transactions accept new authorize actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderTransaction {
    pub id: TransactionId,
    pub type_of: TransactionType,
    pub status: TransactionStatus,
    /// The customer driving the transaction.
    pub agent: Party,
    /// The selling organization.
    pub seller: Party,
    pub start_date: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl PlaceOrderTransaction {
    /// Starts a new in-progress transaction.
    pub fn start(agent: Party, seller: Party, expires: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            type_of: TransactionType::PlaceOrder,
            status: TransactionStatus::InProgress,
            agent,
            seller,
            start_date: Utc::now(),
            expires,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TransactionStatus::InProgress
    }

    /// Fails with `Forbidden` unless `agent_id` owns this transaction.
    pub fn ensure_owned_by(&self, agent_id: &str) -> Result<(), DomainError> {
        if self.agent.id == agent_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "A specified transaction is not yours.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn transaction() -> PlaceOrderTransaction {
        PlaceOrderTransaction::start(
            Party::person("customer-1"),
            Party::organization("seller-1", "Cinema"),
            Utc::now() + Duration::minutes(15),
        )
    }

    #[test]
    fn test_start_is_in_progress() {
        let tx = transaction();
        assert!(tx.is_in_progress());
        assert_eq!(tx.type_of, TransactionType::PlaceOrder);
    }

    #[test]
    fn test_ownership() {
        let tx = transaction();
        assert!(tx.ensure_owned_by("customer-1").is_ok());
        assert!(matches!(
            tx.ensure_owned_by("someone-else"),
            Err(DomainError::Forbidden(_))
        ));
    }
}
