use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{ActionId, TransactionId};
use domain::{
    Action, ActionAttributes, ActionResult, ErrorSummary, Organization, PlaceOrderTransaction,
    TransactionType,
};
use tokio::sync::RwLock;

use crate::{
    ActionQuery, Result, StoreError,
    store::{ActionRepository, OrganizationRepository, TransactionRepository},
};

const ACTION: &str = "Action";
const TRANSACTION: &str = "PlaceOrderTransaction";
const ORGANIZATION: &str = "Organization";

/// In-memory action repository.
///
/// Actions are kept in insertion order, which is also start-date order.
#[derive(Clone, Default)]
pub struct InMemoryActionRepository {
    actions: Arc<RwLock<Vec<Action>>>,
}

impl InMemoryActionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of actions stored.
    pub async fn action_count(&self) -> usize {
        self.actions.read().await.len()
    }

    /// Applies a transition to the stored action under the write lock.
    async fn transition<F>(&self, id: ActionId, f: F) -> Result<Action>
    where
        F: FnOnce(&mut Action) -> std::result::Result<(), domain::ActionError>,
    {
        let mut actions = self.actions.write().await;
        let action = actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found(ACTION, id))?;

        f(action).map_err(|e| StoreError::from_transition(ACTION, id, e))?;
        Ok(action.clone())
    }
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    #[tracing::instrument(skip(self, attributes), fields(purpose_id = %attributes.purpose.id))]
    async fn start(&self, attributes: ActionAttributes) -> Result<Action> {
        let action = Action::start(attributes, Utc::now());
        self.actions.write().await.push(action.clone());
        Ok(action)
    }

    #[tracing::instrument(skip(self, result))]
    async fn complete(&self, id: ActionId, result: ActionResult) -> Result<Action> {
        self.transition(id, |a| a.complete(result, Utc::now())).await
    }

    #[tracing::instrument(skip(self))]
    async fn give_up(&self, id: ActionId, error: ErrorSummary) -> Result<Action> {
        self.transition(id, |a| a.give_up(error, Utc::now())).await
    }

    #[tracing::instrument(skip(self))]
    async fn cancel(&self, id: ActionId) -> Result<Action> {
        self.transition(id, Action::cancel).await
    }

    async fn find_by_id(&self, id: ActionId) -> Result<Action> {
        self.actions
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ACTION, id))
    }

    async fn search(&self, query: ActionQuery) -> Result<Vec<Action>> {
        let actions = self.actions.read().await;
        let matching = actions.iter().filter(|a| query.matches(a)).cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn count(&self, query: ActionQuery) -> Result<u64> {
        let actions = self.actions.read().await;
        Ok(actions.iter().filter(|a| query.matches(a)).count() as u64)
    }
}

/// In-memory transaction repository.
#[derive(Clone, Default)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<HashMap<TransactionId, PlaceOrderTransaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    #[tracing::instrument(skip(self))]
    async fn find_in_progress_by_id(
        &self,
        type_of: TransactionType,
        id: TransactionId,
    ) -> Result<PlaceOrderTransaction> {
        self.transactions
            .read()
            .await
            .get(&id)
            .filter(|t| t.type_of == type_of && t.is_in_progress())
            .cloned()
            .ok_or_else(|| StoreError::not_found(TRANSACTION, id))
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<PlaceOrderTransaction> {
        self.transactions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(TRANSACTION, id))
    }

    async fn save(&self, transaction: PlaceOrderTransaction) -> Result<()> {
        self.transactions
            .write()
            .await
            .insert(transaction.id, transaction);
        Ok(())
    }
}

/// In-memory organization repository.
#[derive(Clone, Default)]
pub struct InMemoryOrganizationRepository {
    organizations: Arc<RwLock<HashMap<String, Organization>>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_by_id(&self, id: &str) -> Result<Organization> {
        self.organizations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ORGANIZATION, id))
    }

    async fn save(&self, organization: Organization) -> Result<()> {
        self.organizations
            .write()
            .await
            .insert(organization.id.clone(), organization);
        Ok(())
    }
}
