use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

use super::{ContractStore, StoreError, UserStore};
use crate::models::contracts::{Contract, ContractPatch};
use crate::models::users::User;

/// Process-local contract store. Contents live as long as the process.
#[derive(Default)]
pub struct MemoryContractStore {
    contracts: RwLock<HashMap<String, Contract>>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for MemoryContractStore {
    async fn create(&self, contract: Contract) -> Result<Contract, StoreError> {
        let mut contracts = self.contracts.write().await;
        if contracts.contains_key(&contract.id) {
            return Err(StoreError::Duplicate(contract.id));
        }
        contracts.insert(contract.id.clone(), contract.clone());
        tracing::debug!(total = contracts.len(), "stored contract {}", contract.id);
        Ok(contract)
    }

    async fn get(&self, id: &str) -> Result<Option<Contract>, StoreError> {
        Ok(self.contracts.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Contract>, StoreError> {
        Ok(self.contracts.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        id: &str,
        patch: ContractPatch,
    ) -> Result<Option<Contract>, StoreError> {
        let mut contracts = self.contracts.write().await;
        let Some(contract) = contracts.get_mut(id) else {
            return Ok(None);
        };
        contract.apply(patch);
        Ok(Some(contract.clone()))
    }
}

/// Process-local user directory storage.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert_if_absent(&self, user: User) -> Result<(User, bool), StoreError> {
        let mut users = self.users.write().await;
        match users.entry(user.id.clone()) {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => Ok((slot.insert(user).clone(), true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contracts::ContractStatus;
    use crate::models::users::Role;
    use chrono::Utc;

    fn contract(id: &str) -> Contract {
        let now = Utc::now();
        Contract {
            id: id.to_string(),
            job_id: "job-1".to_string(),
            contractor_id: "contractor-1".to_string(),
            contractor_name: "Contractor".to_string(),
            location: "Not specified".to_string(),
            worker_id: None,
            enrolled_workers: Vec::new(),
            daily_wage: 450.0,
            number_of_days: 3,
            workers_required: 1,
            workers_enrolled: 0,
            work_hours_per_day: 8.0,
            overtime_rate_per_hour: 0.0,
            minimum_wage_alert: false,
            total_contract_amount: 1350.0,
            contractor_accepted_at: Some(now),
            worker_accepted_at: None,
            status: ContractStatus::Available,
            created_at: now,
            posted_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryContractStore::new();
        store.create(contract("c-1")).await.unwrap();
        let err = store.create(contract("c-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "c-1"));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let store = MemoryContractStore::new();
        let patch = ContractPatch {
            status: Some(ContractStatus::Assigned),
            ..Default::default()
        };
        assert!(store.update("missing", patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let store = MemoryContractStore::new();
        store.create(contract("c-2")).await.unwrap();
        let updated = store
            .update(
                "c-2",
                ContractPatch {
                    worker_id: Some("worker-1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.worker_id.as_deref(), Some("worker-1"));
        assert_eq!(updated.status, ContractStatus::Available);
        assert_eq!(store.get("c-2").await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn existing_user_wins() {
        let store = MemoryUserStore::new();
        let first = User {
            id: "worker-91".to_string(),
            name: "Ramesh".to_string(),
            phone: "+91".to_string(),
            role: Role::Worker,
            created_at: Utc::now(),
        };
        let (_, created) = store.insert_if_absent(first.clone()).await.unwrap();
        assert!(created);

        let renamed = User {
            name: "Suresh".to_string(),
            ..first.clone()
        };
        let (stored, created) = store.insert_if_absent(renamed).await.unwrap();
        assert!(!created);
        assert_eq!(stored, first);
    }
}
