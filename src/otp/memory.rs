use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{OtpRecord, OtpRegistry, Verdict, generate_code};
use crate::db::StoreError;

/// Process-local OTP registry. Expired records are dropped lazily on verify.
pub struct MemoryOtpRegistry {
    records: Mutex<HashMap<String, OtpRecord>>,
    clock: Arc<dyn Clock + Send + Sync>,
    ttl: Duration,
}

impl MemoryOtpRegistry {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, ttl: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    #[cfg(test)]
    pub(crate) async fn pending(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl OtpRegistry for MemoryOtpRegistry {
    async fn send(&self, phone: &str) -> Result<String, StoreError> {
        let code = generate_code();
        let record = OtpRecord::issue(code.clone(), self.clock.utc(), self.ttl);
        let mut records = self.records.lock().await;
        records.insert(phone.to_owned(), record);
        tracing::info!(phone, pending = records.len(), "OTP issued");
        Ok(code)
    }

    async fn verify(&self, phone: &str, code: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get(phone) else {
            tracing::info!(phone, "no pending OTP");
            return Ok(false);
        };

        match record.check(code, self.clock.utc()) {
            Verdict::Expired => {
                tracing::info!(phone, "OTP expired");
                records.remove(phone);
                Ok(false)
            }
            Verdict::Mismatch => {
                tracing::info!(phone, "OTP mismatch");
                Ok(false)
            }
            Verdict::Match => {
                records.remove(phone);
                tracing::info!(phone, "OTP verified");
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::DEFAULT_OTP_TTL;
    use crate::test_support::ManualClock;
    use chrono::TimeDelta;

    fn registry(clock: Arc<ManualClock>) -> MemoryOtpRegistry {
        MemoryOtpRegistry::new(clock, DEFAULT_OTP_TTL)
    }

    #[tokio::test]
    async fn code_is_single_use() {
        let clock = ManualClock::starting();
        let otp = registry(clock);
        let code = otp.send("+919876543210").await.unwrap();

        assert!(otp.verify("+919876543210", &code).await.unwrap());
        assert!(!otp.verify("+919876543210", &code).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_code_keeps_the_pending_record() {
        let clock = ManualClock::starting();
        let otp = registry(clock);
        let code = otp.send("+919876543210").await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert!(!otp.verify("+919876543210", wrong).await.unwrap());
        assert_eq!(otp.pending().await, 1);
        assert!(otp.verify("+919876543210", &code).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_phone_is_rejected() {
        let otp = registry(ManualClock::starting());
        assert!(!otp.verify("+910000000000", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_dropped() {
        let clock = ManualClock::starting();
        let otp = registry(clock.clone());
        let code = otp.send("+919876543210").await.unwrap();

        clock.advance(TimeDelta::minutes(5) + TimeDelta::seconds(1));

        assert!(!otp.verify("+919876543210", &code).await.unwrap());
        assert_eq!(otp.pending().await, 0);
    }

    #[tokio::test]
    async fn code_is_valid_just_before_expiry() {
        let clock = ManualClock::starting();
        let otp = registry(clock.clone());
        let code = otp.send("+919876543210").await.unwrap();

        clock.advance(TimeDelta::minutes(4) + TimeDelta::seconds(59));

        assert!(otp.verify("+919876543210", &code).await.unwrap());
    }

    #[tokio::test]
    async fn resending_replaces_the_previous_code() {
        let clock = ManualClock::starting();
        let otp = registry(clock);
        let mut first = otp.send("+919876543210").await.unwrap();
        let mut second = otp.send("+919876543210").await.unwrap();
        // Regenerate until the codes differ so the assertion is meaningful.
        while first == second {
            first = second;
            second = otp.send("+919876543210").await.unwrap();
        }

        assert_eq!(otp.pending().await, 1);
        assert!(!otp.verify("+919876543210", &first).await.unwrap());
        assert!(otp.verify("+919876543210", &second).await.unwrap());
    }
}
