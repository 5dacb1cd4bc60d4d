//! One-time codes used to sign contracts and register accounts.
//!
//! There is no SMS channel: the issued code is handed back to the caller so the
//! client can show it. At most one code is pending per phone number; issuing a
//! new one replaces the old. A code is consumed by the first successful check.

mod memory;
mod redis_registry;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::StoreError;

pub use memory::MemoryOtpRegistry;
pub use redis_registry::RedisOtpRegistry;

pub const OTP_LENGTH: usize = 6;
pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// A pending code for one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn issue(code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { code, expires_at }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compare a submitted code against this record at `now`. Expiry wins over a match.
    pub fn check(&self, code: &str, now: DateTime<Utc>) -> Verdict {
        if self.is_expired(now) {
            Verdict::Expired
        } else if self.code != code {
            Verdict::Mismatch
        } else {
            Verdict::Match
        }
    }
}

/// Outcome of checking a code against a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Past its expiry; the record should be dropped.
    Expired,
    /// Wrong code; the record stays pending.
    Mismatch,
    /// Correct and live; the record should be consumed.
    Match,
}

#[async_trait]
pub trait OtpRegistry: Send + Sync {
    /// Issue a fresh code for `phone`, replacing any pending one, and return it.
    async fn send(&self, phone: &str) -> Result<String, StoreError>;

    /// Check `code` against the pending code for `phone`.
    ///
    /// Unknown phone, expired code and wrong code all yield `false`. Expired
    /// records are dropped; a match consumes the record.
    async fn verify(&self, phone: &str, code: &str) -> Result<bool, StoreError>;
}

/// Six independent decimal digits; leading zeros allowed.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
