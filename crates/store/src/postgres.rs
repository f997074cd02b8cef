use async_trait::async_trait;
use chrono::Utc;
use common::ActionId;
use domain::{Action, ActionAttributes, ActionResult, ActionStatus, ActionType, ErrorSummary};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{ActionQuery, Result, StoreError, store::ActionRepository};

const ACTION: &str = "Action";

const COLUMNS: &str =
    "id, status, kind, purpose_id, purpose, agent, recipient, object, result, error, start_date, end_date";

/// PostgreSQL-backed action repository.
///
/// Parties, object, result and error are stored as JSONB; status
/// transitions are single conditional `UPDATE ... RETURNING` statements.
#[derive(Clone)]
pub struct PostgresActionRepository {
    pool: PgPool,
}

impl PostgresActionRepository {
    /// Creates a new PostgreSQL action repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_action(row: PgRow) -> Result<Action> {
        let status: String = row.try_get("status")?;
        let status = status.parse::<ActionStatus>().map_err(StoreError::Corrupt)?;
        let result: Option<serde_json::Value> = row.try_get("result")?;
        let error: Option<serde_json::Value> = row.try_get("error")?;

        Ok(Action {
            id: ActionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            type_of: ActionType::AuthorizeAction,
            status,
            agent: serde_json::from_value(row.try_get("agent")?)?,
            recipient: serde_json::from_value(row.try_get("recipient")?)?,
            object: serde_json::from_value(row.try_get("object")?)?,
            purpose: serde_json::from_value(row.try_get("purpose")?)?,
            result: result.map(serde_json::from_value).transpose()?,
            error: error.map(serde_json::from_value).transpose()?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        })
    }

    /// Builds the WHERE clause for a query; binds are applied in the same order.
    fn where_clause(query: &ActionQuery) -> String {
        let mut sql = String::from(" WHERE 1=1");
        let mut param_count = 0;

        if query.purpose_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND purpose_id = ${param_count}"));
        }
        if query.statuses.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ANY(${param_count})"));
        }
        if query.kind.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND kind = ${param_count}"));
        }
        sql
    }

    fn status_names(query: &ActionQuery) -> Option<Vec<String>> {
        query
            .statuses
            .as_ref()
            .map(|s| s.iter().map(|st| st.as_str().to_string()).collect())
    }
}

#[async_trait]
impl ActionRepository for PostgresActionRepository {
    #[tracing::instrument(skip(self, attributes), fields(purpose_id = %attributes.purpose.id))]
    async fn start(&self, attributes: ActionAttributes) -> Result<Action> {
        let action = Action::start(attributes, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO actions (id, type_of, status, kind, purpose_id, purpose, agent, recipient, object, start_date)
            VALUES ($1, 'AuthorizeAction', $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(action.id.as_uuid())
        .bind(action.status.as_str())
        .bind(action.kind().as_str())
        .bind(action.purpose.id.as_uuid())
        .bind(serde_json::to_value(action.purpose)?)
        .bind(serde_json::to_value(&action.agent)?)
        .bind(serde_json::to_value(&action.recipient)?)
        .bind(serde_json::to_value(&action.object)?)
        .bind(action.start_date)
        .execute(&self.pool)
        .await?;

        Ok(action)
    }

    #[tracing::instrument(skip(self, result))]
    async fn complete(&self, id: ActionId, result: ActionResult) -> Result<Action> {
        let sql = format!(
            "UPDATE actions SET status = 'Completed', result = $2, end_date = $3 \
             WHERE id = $1 AND status = 'Started' RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(serde_json::to_value(&result)?)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(ACTION, id))?;

        Self::row_to_action(row)
    }

    #[tracing::instrument(skip(self))]
    async fn give_up(&self, id: ActionId, error: ErrorSummary) -> Result<Action> {
        let sql = format!(
            "UPDATE actions SET status = 'FailedGiveUp', error = $2, end_date = $3 \
             WHERE id = $1 AND status = 'Started' RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(serde_json::to_value(&error)?)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(ACTION, id))?;

        Self::row_to_action(row)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel(&self, id: ActionId) -> Result<Action> {
        let sql = format!(
            "UPDATE actions SET status = 'Canceled' \
             WHERE id = $1 AND status = 'Completed' RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(ACTION, id))?;

        Self::row_to_action(row)
    }

    async fn find_by_id(&self, id: ActionId) -> Result<Action> {
        let sql = format!("SELECT {COLUMNS} FROM actions WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(ACTION, id))?;

        Self::row_to_action(row)
    }

    async fn search(&self, query: ActionQuery) -> Result<Vec<Action>> {
        let mut sql = format!("SELECT {COLUMNS} FROM actions");
        sql.push_str(&Self::where_clause(&query));
        sql.push_str(" ORDER BY start_date ASC");
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut q = sqlx::query(&sql);
        if let Some(purpose_id) = query.purpose_id {
            q = q.bind(purpose_id.as_uuid());
        }
        if let Some(statuses) = Self::status_names(&query) {
            q = q.bind(statuses);
        }
        if let Some(kind) = query.kind {
            q = q.bind(kind.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_action).collect()
    }

    async fn count(&self, query: ActionQuery) -> Result<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM actions");
        sql.push_str(&Self::where_clause(&query));

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(purpose_id) = query.purpose_id {
            q = q.bind(purpose_id.as_uuid());
        }
        if let Some(statuses) = Self::status_names(&query) {
            q = q.bind(statuses);
        }
        if let Some(kind) = query.kind {
            q = q.bind(kind.as_str());
        }

        let count = q.fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
