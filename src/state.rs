use actix_web::web;
use mockable::Clock;
use std::sync::Arc;

use crate::cache::RedisCache;
use crate::config::AppConfig;
use crate::db::{
    ContractStore, MemoryContractStore, MemoryUserStore, PgStore, StoreError, UserStore,
    create_pool,
};
use crate::otp::{MemoryOtpRegistry, OtpRegistry, RedisOtpRegistry};
use crate::services::{ContractLocks, ContractService, UserDirectory};
use migration::{Migrator, MigratorTrait};

/// Everything the handlers pull out of actix app data.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<AppConfig>,
    pub contracts: web::Data<ContractService>,
    pub users: web::Data<UserDirectory>,
    pub otp: web::Data<Arc<dyn OtpRegistry>>,
}

impl AppState {
    /// Wire services over the given backends.
    pub fn new(
        config: AppConfig,
        contract_store: Arc<dyn ContractStore>,
        user_store: Arc<dyn UserStore>,
        otp: Arc<dyn OtpRegistry>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let locks = ContractLocks::new(config.contract_lock_idle);
        let contracts = ContractService::new(contract_store, otp.clone(), clock.clone(), locks);
        let users = UserDirectory::new(user_store, clock);
        Self {
            config: web::Data::new(config),
            contracts: web::Data::new(contracts),
            users: web::Data::new(users),
            otp: web::Data::new(otp),
        }
    }

    /// All-in-memory state; nothing survives a restart.
    pub fn in_memory(config: AppConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let otp: Arc<dyn OtpRegistry> =
            Arc::new(MemoryOtpRegistry::new(clock.clone(), config.otp_ttl));
        Self::new(
            config,
            Arc::new(MemoryContractStore::new()),
            Arc::new(MemoryUserStore::new()),
            otp,
            clock,
        )
    }

    /// Pick backends from `config`: Postgres when `DATABASE_URL` is set (migrations
    /// are applied first), Redis for OTPs when `REDIS_URL` is set, memory otherwise.
    pub async fn from_config(
        config: AppConfig,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, StoreError> {
        let (contract_store, user_store): (Arc<dyn ContractStore>, Arc<dyn UserStore>) =
            match &config.database_url {
                Some(url) => {
                    let db = create_pool(url).await?;
                    Migrator::up(&db, None).await?;
                    tracing::info!("Connected to Postgres");
                    let store = Arc::new(PgStore::new(db));
                    let contracts: Arc<dyn ContractStore> = store.clone();
                    let users: Arc<dyn UserStore> = store;
                    (contracts, users)
                }
                None => {
                    tracing::info!("DATABASE_URL not set, keeping contracts and users in memory");
                    let contracts: Arc<dyn ContractStore> = Arc::new(MemoryContractStore::new());
                    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
                    (contracts, users)
                }
            };

        let otp: Arc<dyn OtpRegistry> = match &config.redis_url {
            Some(url) => {
                let cache = RedisCache::new(url).await?;
                tracing::info!("Connected to Redis");
                Arc::new(RedisOtpRegistry::new(cache, clock.clone(), config.otp_ttl))
            }
            None => {
                tracing::info!("REDIS_URL not set, keeping OTPs in memory");
                Arc::new(MemoryOtpRegistry::new(clock.clone(), config.otp_ttl))
            }
        };

        Ok(Self::new(config, contract_store, user_store, otp, clock))
    }

    /// Register the shared state as app data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.contracts.clone())
            .app_data(self.users.clone())
            .app_data(self.otp.clone());
    }
}
