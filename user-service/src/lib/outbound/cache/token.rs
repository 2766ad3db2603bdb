use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::RedisError;

use crate::domain::auth::errors::TokenCacheError;
use crate::domain::auth::ports::TokenCache;

const KEY_PREFIX: &str = "auth:token:";
const VALID_MARKER: &str = "valid";

/// Redis-backed record of tokens known to be valid.
///
/// Each token is stored under `auth:token:<token>` with a TTL, so Redis
/// evicts the entry on its own once the token expires.
pub struct RedisTokenCache {
    connection: ConnectionManager,
}

impl RedisTokenCache {
    /// Connect to Redis at `redis_url`.
    ///
    /// The connection manager reconnects on its own after transient failures.
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection })
    }

    fn token_key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

impl From<RedisError> for TokenCacheError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error()
            || e.is_connection_refusal()
            || e.is_timeout()
            || e.is_connection_dropped()
        {
            TokenCacheError::Unavailable(e.to_string())
        } else {
            TokenCacheError::CommandFailed(e.to_string())
        }
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn mark_valid(&self, token: &str, ttl: Duration) -> Result<(), TokenCacheError> {
        // EX takes whole seconds and rejects 0; rounding up would outlive the token
        let seconds = ttl.as_secs();
        if seconds == 0 {
            tracing::debug!("Token expires within a second, not caching");
            return Ok(());
        }

        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(Self::token_key(token), VALID_MARKER, seconds)
            .await?;

        Ok(())
    }

    async fn is_valid(&self, token: &str) -> Result<bool, TokenCacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(Self::token_key(token)).await?;

        Ok(value.as_deref() == Some(VALID_MARKER))
    }
}
