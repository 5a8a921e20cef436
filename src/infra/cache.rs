//! Redis connection used for request rate limiting.
//!
//! Domain data is never cached; every read goes to Postgres. Redis only
//! holds fixed-window request counters.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::config::CACHE_PREFIX_RATE_LIMIT;
use crate::errors::AppResult;

/// Redis wrapper with a multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis, returning an error instead of panicking.
    pub async fn try_connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Redis connected");
        Ok(Self { connection })
    }

    /// Round-trip check used by the health endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Count one request against `identifier`'s current window.
    ///
    /// Returns `(count, allowed)`. The window starts with the first request
    /// and expires `window_seconds` later.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}
