use async_trait::async_trait;
use common::{ActionId, TransactionId};
use domain::{
    Action, ActionAttributes, ActionResult, ErrorSummary, Organization, PlaceOrderTransaction,
    TransactionType,
};

use crate::{ActionQuery, Result};

/// Persists authorize actions and guards their transitions.
///
/// Every transition is a conditional update keyed on the action id and the
/// status it leaves; a miss on either surfaces as `StoreError::NotFound`.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Creates and persists an action in `Started` status.
    async fn start(&self, attributes: ActionAttributes) -> Result<Action>;

    /// `Started` → `Completed`, recording the result and end date.
    async fn complete(&self, id: ActionId, result: ActionResult) -> Result<Action>;

    /// `Started` → `FailedGiveUp`, recording the sanitized error and end date.
    async fn give_up(&self, id: ActionId, error: ErrorSummary) -> Result<Action>;

    /// `Completed` → `Canceled`.
    ///
    /// The returned action still carries the result needed to compensate the remote hold.
    async fn cancel(&self, id: ActionId) -> Result<Action>;

    /// Loads an action by id.
    async fn find_by_id(&self, id: ActionId) -> Result<Action>;

    /// Returns actions matching the query, oldest first.
    async fn search(&self, query: ActionQuery) -> Result<Vec<Action>>;

    /// Counts actions matching the query (the limit is ignored).
    async fn count(&self, query: ActionQuery) -> Result<u64>;
}

/// Resolves business transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Loads a transaction of the given type, failing `NotFound` unless it is in progress.
    async fn find_in_progress_by_id(
        &self,
        type_of: TransactionType,
        id: TransactionId,
    ) -> Result<PlaceOrderTransaction>;

    /// Loads a transaction regardless of status.
    async fn find_by_id(&self, id: TransactionId) -> Result<PlaceOrderTransaction>;

    /// Inserts or replaces a transaction.
    async fn save(&self, transaction: PlaceOrderTransaction) -> Result<()>;
}

/// Resolves seller organizations.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Organization>;

    async fn save(&self, organization: Organization) -> Result<()>;
}
