pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection, DbErr};
use thiserror::Error;

use crate::models::contracts::{Contract, ContractPatch};
use crate::models::users::User;

pub use memory::{MemoryContractStore, MemoryUserStore};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("record {0} already exists")]
    Duplicate(String),
}

/// Keyed repository of contract records.
///
/// No transactions and no version checks: callers that read-modify-write must
/// serialize themselves (see [`crate::services::locks::ContractLocks`]).
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Insert a fully formed contract. The id must be new.
    async fn create(&self, contract: Contract) -> Result<Contract, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Contract>, StoreError>;

    /// All contracts, in no particular order.
    async fn list_all(&self) -> Result<Vec<Contract>, StoreError>;

    /// Shallow-merge `patch` into the stored record. `None` if the id is unknown.
    async fn update(&self, id: &str, patch: ContractPatch)
    -> Result<Option<Contract>, StoreError>;
}

/// Append-only user records keyed by their derived id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert `user` unless its id is taken; either way return the stored record
    /// and whether this call created it.
    async fn insert_if_absent(&self, user: User) -> Result<(User, bool), StoreError>;
}

/// Open a SeaORM connection pool for `database_url`.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
