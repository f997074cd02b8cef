//! Hold parameters and results of authorize actions, one shape per ledger backend.

use serde::{Deserialize, Serialize};

/// The ledger backend an authorize action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizeKind {
    PointAward,
    Account,
    Coin,
}

impl AuthorizeKind {
    /// Returns the kind as used in URLs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizeKind::PointAward => "point-award",
            AuthorizeKind::Account => "account",
            AuthorizeKind::Coin => "coin",
        }
    }

    /// Parses the URL form produced by [`AuthorizeKind::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "point-award" => Some(AuthorizeKind::PointAward),
            "account" => Some(AuthorizeKind::Account),
            "coin" => Some(AuthorizeKind::Coin),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthorizeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque handle to a not-yet-settled hold on a remote ledger.
///
/// Only valid as the argument to the cancel call of the ledger that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLedgerTransaction {
    pub id: String,
    pub endpoint: String,
}

/// Adapter-specific hold parameters recorded on the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type_of")]
pub enum AuthorizeObject {
    PointAward {
        amount: i64,
        to_account_number: String,
        notes: Option<String>,
    },
    Account {
        amount: i64,
        account_type: String,
        from_account_number: String,
        /// Present only when the hold is a transfer.
        to_account_number: Option<String>,
        notes: Option<String>,
    },
    Coin {
        amount: i64,
        from_account_number: String,
        to_account_number: String,
        notes: Option<String>,
    },
}

impl AuthorizeObject {
    pub fn kind(&self) -> AuthorizeKind {
        match self {
            AuthorizeObject::PointAward { .. } => AuthorizeKind::PointAward,
            AuthorizeObject::Account { .. } => AuthorizeKind::Account,
            AuthorizeObject::Coin { .. } => AuthorizeKind::Coin,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            AuthorizeObject::PointAward { amount, .. }
            | AuthorizeObject::Account { amount, .. }
            | AuthorizeObject::Coin { amount, .. } => *amount,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            AuthorizeObject::PointAward { notes, .. }
            | AuthorizeObject::Account { notes, .. }
            | AuthorizeObject::Coin { notes, .. } => notes.as_deref(),
        }
    }
}

/// Result recorded when an action completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type_of")]
pub enum ActionResult {
    PointAward {
        amount: i64,
        point_transaction: PendingLedgerTransaction,
    },
    Account {
        amount: i64,
        account_type: String,
        pending_transaction: PendingLedgerTransaction,
    },
    Coin {
        amount: i64,
        coin_transaction: PendingLedgerTransaction,
    },
}

impl ActionResult {
    pub fn kind(&self) -> AuthorizeKind {
        match self {
            ActionResult::PointAward { .. } => AuthorizeKind::PointAward,
            ActionResult::Account { .. } => AuthorizeKind::Account,
            ActionResult::Coin { .. } => AuthorizeKind::Coin,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            ActionResult::PointAward { amount, .. }
            | ActionResult::Account { amount, .. }
            | ActionResult::Coin { amount, .. } => *amount,
        }
    }

    /// The remote hold to compensate on cancel.
    pub fn pending_transaction(&self) -> &PendingLedgerTransaction {
        match self {
            ActionResult::PointAward {
                point_transaction, ..
            } => point_transaction,
            ActionResult::Account {
                pending_transaction,
                ..
            } => pending_transaction,
            ActionResult::Coin {
                coin_transaction, ..
            } => coin_transaction,
        }
    }
}
