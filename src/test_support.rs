//! Helpers shared by unit and integration tests.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A clock that only moves when told to.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// 2025-03-01T10:00:00Z, shared by tests that only need a fixed start.
    pub fn starting() -> Arc<Self> {
        Arc::new(Self::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        ))
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.lock();
        *now += delta;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
