use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-contract async mutexes serializing read-modify-write on one contract.
///
/// Entries idle longer than the configured period are evicted. This only
/// covers one process; replicas sharing a database still race.
#[derive(Clone)]
pub struct ContractLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl ContractLocks {
    pub fn new(idle: Duration) -> Self {
        Self {
            locks: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Wait for exclusive access to `contract_id`; released when the guard drops.
    pub async fn acquire(&self, contract_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(contract_id.to_owned(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}
