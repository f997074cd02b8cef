use common::TransactionId;
use domain::{Action, ActionStatus, AuthorizeKind};

/// Builder for constructing action searches.
#[derive(Debug, Clone, Default)]
pub struct ActionQuery {
    /// Filter by owning transaction.
    pub purpose_id: Option<TransactionId>,

    /// Filter by status (any of these).
    pub statuses: Option<Vec<ActionStatus>>,

    /// Filter by ledger backend.
    pub kind: Option<AuthorizeKind>,

    /// Maximum number of actions to return.
    pub limit: Option<usize>,
}

impl ActionQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for the actions of a transaction.
    pub fn for_purpose(purpose_id: TransactionId) -> Self {
        Self {
            purpose_id: Some(purpose_id),
            ..Default::default()
        }
    }

    /// Filters by a single status.
    pub fn status(mut self, status: ActionStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    /// Filters by several statuses.
    pub fn statuses(mut self, statuses: Vec<ActionStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    /// Filters by ledger backend.
    pub fn kind(mut self, kind: AuthorizeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Limits the number of actions returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the action satisfies every filter except the limit.
    pub fn matches(&self, action: &Action) -> bool {
        if let Some(id) = self.purpose_id
            && action.purpose.id != id
        {
            return false;
        }
        if let Some(ref statuses) = self.statuses
            && !statuses.contains(&action.status)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && action.kind() != kind
        {
            return false;
        }
        true
    }
}
