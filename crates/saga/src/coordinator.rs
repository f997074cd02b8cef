//! Authorize action saga: local intent, remote hold, terminal local write.

use std::sync::Arc;
use std::time::Instant;

use common::{ActionId, TransactionId};
use domain::{
    Action, ActionAttributes, ActionPurpose, DomainError, PlaceOrderTransaction, TransactionType,
};
use store::{ActionQuery, ActionRepository, TransactionRepository};

use crate::adapters::LedgerAdapter;

/// Request to place a new hold for a transaction.
#[derive(Debug, Clone)]
pub struct CreateAuthorization<P> {
    pub transaction_id: TransactionId,
    /// Id of the caller; must own the transaction.
    pub agent_id: String,
    pub object: P,
}

/// Request to release a previously placed hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelAuthorization<'a> {
    pub transaction_id: TransactionId,
    pub agent_id: &'a str,
    pub action_id: ActionId,
}

/// Orchestrates authorize actions against one ledger backend.
///
/// Within a `create` call the local `start` write always precedes the remote
/// hold, and the remote outcome always precedes the terminal local write, so
/// a `FailedGiveUp` action is always one that was `Started`.
pub struct AuthorizeActionSaga<L: LedgerAdapter> {
    actions: Arc<dyn ActionRepository>,
    transactions: Arc<dyn TransactionRepository>,
    adapter: L,
}

impl<L: LedgerAdapter> AuthorizeActionSaga<L> {
    pub fn new(
        actions: Arc<dyn ActionRepository>,
        transactions: Arc<dyn TransactionRepository>,
        adapter: L,
    ) -> Self {
        Self {
            actions,
            transactions,
            adapter,
        }
    }

    pub fn adapter(&self) -> &L {
        &self.adapter
    }

    /// Places a pending hold and records it as a completed action.
    ///
    /// If the remote hold is rejected the action is given up (best effort)
    /// and the rejection is returned translated into a [`DomainError`].
    #[tracing::instrument(
        skip(self, request),
        fields(kind = %self.adapter.kind(), transaction_id = %request.transaction_id)
    )]
    pub async fn create(
        &self,
        request: CreateAuthorization<L::Params>,
    ) -> Result<Action, DomainError> {
        let kind = self.adapter.kind().as_str();
        let started_at = Instant::now();

        let transaction = self
            .find_owned_transaction(request.transaction_id, &request.agent_id)
            .await?;
        let prepared = self.adapter.prepare(&transaction, request.object).await?;

        let action = self
            .actions
            .start(ActionAttributes {
                agent: prepared.agent,
                recipient: prepared.recipient,
                object: prepared.object,
                purpose: ActionPurpose {
                    type_of: transaction.type_of,
                    id: transaction.id,
                },
            })
            .await?;
        tracing::info!(action_id = %action.id, "authorize action started");

        let result = match self.adapter.start(&action).await {
            Ok(result) => result,
            Err(err) => {
                if let Err(give_up_err) = self.actions.give_up(action.id, err.summary()).await {
                    tracing::warn!(
                        action_id = %action.id,
                        error = %give_up_err,
                        "failed to give up authorize action"
                    );
                }
                let err = DomainError::from(err);
                metrics::counter!("authorize_action_failed_total", "kind" => kind).increment(1);
                tracing::warn!(action_id = %action.id, error = %err, "authorize action failed");
                return Err(err);
            }
        };

        let action = match self.actions.complete(action.id, result.clone()).await {
            Ok(action) => action,
            Err(err) => {
                tracing::error!(
                    action_id = %action.id,
                    pending_transaction_id = %result.pending_transaction().id,
                    error = %err,
                    "remote hold placed but action not completed"
                );
                return Err(err.into());
            }
        };

        metrics::counter!("authorize_action_created_total", "kind" => kind).increment(1);
        metrics::histogram!("authorize_action_duration_seconds", "kind" => kind)
            .record(started_at.elapsed().as_secs_f64());
        tracing::info!(action_id = %action.id, "authorize action completed");

        Ok(action)
    }

    /// Cancels a completed action and releases its remote hold.
    ///
    /// The local record moves to `Canceled` before the remote call. A remote
    /// failure is returned to the caller but does not roll the record back.
    #[tracing::instrument(
        skip(self, request),
        fields(
            kind = %self.adapter.kind(),
            transaction_id = %request.transaction_id,
            action_id = %request.action_id
        )
    )]
    pub async fn cancel(&self, request: CancelAuthorization<'_>) -> Result<Action, DomainError> {
        let transaction = self
            .find_owned_transaction(request.transaction_id, request.agent_id)
            .await?;

        let existing = self.actions.find_by_id(request.action_id).await?;
        if existing.purpose.id != transaction.id || existing.kind() != self.adapter.kind() {
            return Err(DomainError::not_found("Action"));
        }

        let action = self.actions.cancel(request.action_id).await?;
        tracing::info!("authorize action canceled");

        let Some(result) = action.result.as_ref() else {
            return Err(DomainError::not_found("Action result"));
        };
        if let Err(err) = self.adapter.cancel(result).await {
            tracing::error!(
                pending_transaction_id = %result.pending_transaction().id,
                error = %err,
                "remote hold not released for canceled action"
            );
            return Err(err.into());
        }

        metrics::counter!("authorize_action_canceled_total", "kind" => self.adapter.kind().as_str())
            .increment(1);

        Ok(action)
    }

    /// Lists this backend's actions on a transaction owned by `agent_id`, oldest first.
    ///
    /// Closed transactions can still be listed.
    pub async fn list(
        &self,
        transaction_id: TransactionId,
        agent_id: &str,
    ) -> Result<Vec<Action>, DomainError> {
        self.transactions
            .find_by_id(transaction_id)
            .await?
            .ensure_owned_by(agent_id)?;

        let query = ActionQuery::for_purpose(transaction_id).kind(self.adapter.kind());
        Ok(self.actions.search(query).await?)
    }

    async fn find_owned_transaction(
        &self,
        id: TransactionId,
        agent_id: &str,
    ) -> Result<PlaceOrderTransaction, DomainError> {
        let transaction = self
            .transactions
            .find_in_progress_by_id(TransactionType::PlaceOrder, id)
            .await?;
        transaction.ensure_owned_by(agent_id)?;
        Ok(transaction)
    }
}
