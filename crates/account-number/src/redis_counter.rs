//! Redis-backed atomic counter.
//!
//! `MULTI; INCR key; EXPIREAT key ts; EXEC` in one pipeline, so the
//! increment and the expiry refresh land together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Client;
use redis::aio::ConnectionManager;

use crate::counter::AtomicCounter;
use crate::{AccountNumberError, Result};

/// `Redis` counter shared by every issuer instance.
#[derive(Clone)]
pub struct RedisCounter {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisCounter {
    /// Connects to `Redis`.
    ///
    /// # Errors
    ///
    /// Returns error if connection to `Redis` fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let conn_manager = ConnectionManager::new(client).await?;
        Ok(Self { conn_manager })
    }
}

#[async_trait]
impl AtomicCounter for RedisCounter {
    #[tracing::instrument(skip(self))]
    async fn incr_with_expiry(&self, key: &str, expire_at: DateTime<Utc>) -> Result<i64> {
        let mut conn = self.conn_manager.clone();

        let (raw,): (redis::Value,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire_at(key, expire_at.timestamp())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key, "counter pipeline failed");
                AccountNumberError::Counter(e)
            })?;

        redis::from_redis_value::<i64>(&raw).map_err(|e| {
            AccountNumberError::ServiceUnavailable(format!(
                "counter {key} did not return an integer: {e}"
            ))
        })
    }
}
