use app_core::error::AppError;
use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8};
use redis::AsyncCommands;

const STATE_KEY_PREFIX: &str = "sso_state:";

/// How long an issued state nonce stays redeemable. A callback arriving
/// after this window is treated the same as a forged one.
const STATE_TTL_SECS: u64 = 600;

/// Store for the single-use state nonces that tie an authorization redirect
/// to its callback.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send + Sync {
    /// Records a freshly issued state nonce with its expiry window.
    async fn issue(&self, state: &str) -> Result<(), AppError>;

    /// Consumes the nonce, returning whether it was known and unexpired.
    /// A second call with the same nonce always returns `false`.
    async fn verify(&self, state: &str) -> Result<bool, AppError>;
}

/// Redis-backed implementation of [`StateStore`].
///
/// Verification uses `GETDEL` so check-and-invalidate is a single atomic
/// operation; two concurrent callbacks with the same nonce can never both
/// pass.
pub struct StateRedis {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl StateRedis {
    pub fn new(pool: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for StateRedis {
    async fn issue(&self, state: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(format!("{STATE_KEY_PREFIX}{state}"), true, STATE_TTL_SECS).await?;
        Ok(())
    }

    async fn verify(&self, state: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;
        let found: Option<String> = conn.get_del(format!("{STATE_KEY_PREFIX}{state}")).await?;
        Ok(found.is_some())
    }
}
