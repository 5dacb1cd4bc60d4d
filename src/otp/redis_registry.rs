use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

use super::{OtpRecord, OtpRegistry, Verdict, generate_code};
use crate::cache::{RedisCache, keys};
use crate::db::StoreError;

/// OTP registry shared across processes through Redis.
///
/// Records carry a native TTL so Redis drops stale codes on its own. A match
/// only counts for the caller whose compare-and-delete removed exactly the
/// record it read; a record replaced by a newer `send` is never removed.
pub struct RedisOtpRegistry {
    cache: RedisCache,
    clock: Arc<dyn Clock + Send + Sync>,
    ttl: Duration,
}

impl RedisOtpRegistry {
    pub fn new(cache: RedisCache, clock: Arc<dyn Clock + Send + Sync>, ttl: Duration) -> Self {
        Self { cache, clock, ttl }
    }
}

#[async_trait]
impl OtpRegistry for RedisOtpRegistry {
    async fn send(&self, phone: &str) -> Result<String, StoreError> {
        let code = generate_code();
        let record = OtpRecord::issue(code.clone(), self.clock.utc(), self.ttl);
        let ttl_secs = self.ttl.as_secs().max(1);
        self.cache
            .set(&keys::otp(phone), &record, Some(ttl_secs))
            .await?;
        tracing::info!(phone, ttl_secs, "OTP issued");
        Ok(code)
    }

    async fn verify(&self, phone: &str, code: &str) -> Result<bool, StoreError> {
        let key = keys::otp(phone);
        let Some(raw) = self.cache.get_raw(&key).await? else {
            tracing::info!(phone, "no pending OTP");
            return Ok(false);
        };
        let record: OtpRecord = serde_json::from_str(&raw)?;

        // Drops go through compare-and-delete so a code re-sent after the read survives.
        match record.check(code, self.clock.utc()) {
            Verdict::Expired => {
                tracing::info!(phone, "OTP expired");
                self.cache.delete_if_equals(&key, &raw).await?;
                Ok(false)
            }
            Verdict::Mismatch => {
                tracing::info!(phone, "OTP mismatch");
                Ok(false)
            }
            Verdict::Match => {
                let consumed = self.cache.delete_if_equals(&key, &raw).await?;
                if consumed {
                    tracing::info!(phone, "OTP verified");
                } else {
                    tracing::warn!(phone, "OTP consumed or replaced by a concurrent request");
                }
                Ok(consumed)
            }
        }
    }
}
