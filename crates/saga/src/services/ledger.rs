//! Ledger service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::PendingLedgerTransaction;

use crate::error::LedgerError;

/// Direction of value movement for a pending hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldKind {
    /// Credit an account; used for point awards.
    Deposit { to_account_number: String },
    /// Debit an account without a counterparty.
    Withdraw { from_account_number: String },
    /// Move value between two accounts.
    Transfer {
        from_account_number: String,
        to_account_number: String,
    },
}

/// Parameters of a pending hold placed on a remote ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerHold {
    pub kind: HoldKind,
    pub account_type: String,
    pub amount: i64,
    pub agent_name: String,
    pub recipient_name: String,
    pub notes: Option<String>,
    /// Instant after which the ledger may expire the hold.
    pub expires: DateTime<Utc>,
}

/// Client for a remote ledger that supports pending holds.
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Service name used to tag remote failures.
    fn name(&self) -> &str;

    /// Places a pending hold and returns its handle.
    async fn start(&self, hold: LedgerHold) -> Result<PendingLedgerTransaction, LedgerError>;

    /// Cancels a pending hold previously returned by [`LedgerService::start`].
    async fn cancel(&self, transaction_id: &str) -> Result<(), LedgerError>;
}

#[derive(Debug, Default)]
struct InMemoryLedgerState {
    holds: HashMap<String, LedgerHold>,
    next_id: u32,
    start_calls: Vec<LedgerHold>,
    cancel_calls: Vec<String>,
    fail_start_with: Option<u16>,
    fail_cancel_with: Option<u16>,
}

/// In-memory ledger for testing and local runs.
#[derive(Debug, Clone)]
pub struct InMemoryLedgerService {
    name: String,
    endpoint: String,
    id_prefix: String,
    state: Arc<Mutex<InMemoryLedgerState>>,
}

impl InMemoryLedgerService {
    /// Creates a ledger issuing ids `{id_prefix}1`, `{id_prefix}2`, ...
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            id_prefix: id_prefix.into(),
            state: Arc::new(Mutex::new(InMemoryLedgerState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, InMemoryLedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every subsequent start call fail with the given status.
    pub fn fail_start_with(&self, status: Option<u16>) {
        self.state().fail_start_with = status;
    }

    /// Makes every subsequent cancel call fail with the given status.
    pub fn fail_cancel_with(&self, status: Option<u16>) {
        self.state().fail_cancel_with = status;
    }

    /// Number of start calls received, including failed ones.
    pub fn start_count(&self) -> usize {
        self.state().start_calls.len()
    }

    /// Holds received by start, in call order.
    pub fn start_calls(&self) -> Vec<LedgerHold> {
        self.state().start_calls.clone()
    }

    /// Transaction ids received by cancel, in call order.
    pub fn cancel_calls(&self) -> Vec<String> {
        self.state().cancel_calls.clone()
    }

    /// Number of holds placed and not yet canceled.
    pub fn pending_count(&self) -> usize {
        self.state().holds.len()
    }

    pub fn has_pending(&self, transaction_id: &str) -> bool {
        self.state().holds.contains_key(transaction_id)
    }
}

#[async_trait]
impl LedgerService for InMemoryLedgerService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, hold: LedgerHold) -> Result<PendingLedgerTransaction, LedgerError> {
        let mut state = self.state();
        state.start_calls.push(hold.clone());

        if let Some(status) = state.fail_start_with {
            return Err(LedgerError::remote(&self.name, status, "hold rejected"));
        }
        if hold.amount <= 0 {
            return Err(LedgerError::remote(
                &self.name,
                400,
                "amount must be positive",
            ));
        }

        state.next_id += 1;
        let id = format!("{}{}", self.id_prefix, state.next_id);
        state.holds.insert(id.clone(), hold);

        Ok(PendingLedgerTransaction {
            id,
            endpoint: self.endpoint.clone(),
        })
    }

    async fn cancel(&self, transaction_id: &str) -> Result<(), LedgerError> {
        let mut state = self.state();
        state.cancel_calls.push(transaction_id.to_string());

        if let Some(status) = state.fail_cancel_with {
            return Err(LedgerError::remote(&self.name, status, "cancel rejected"));
        }

        state
            .holds
            .remove(transaction_id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::remote(&self.name, 404, "transaction not found"))
    }
}
