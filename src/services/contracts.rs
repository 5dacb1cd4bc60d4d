use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use rand::Rng;
use std::sync::Arc;

use crate::db::ContractStore;
use crate::error::AppError;
use crate::models::contracts::{
    Contract, ContractPatch, ContractStatus, EnrolledWorker, Enrollment, NewContract,
};
use crate::models::users::Role;
use crate::otp::OtpRegistry;
use crate::services::export;
use crate::services::locks::ContractLocks;

pub const DEFAULT_LOCATION: &str = "Not specified";
pub const DEFAULT_CONTRACTOR_NAME: &str = "Contractor";
pub const DEFAULT_WORK_HOURS: f64 = 8.0;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Result of a successful enrollment.
#[derive(Debug, Clone)]
pub struct EnrollOutcome {
    pub contract: Contract,
    pub spots_remaining: u32,
}

/// Result of a successful OTP-signed acceptance.
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    pub contract: Contract,
    /// Whether this call moved the contract from `assigned` to `active`.
    pub activated: bool,
    pub message: String,
}

/// Contract creation, worker enrollment and dual-signature acceptance.
///
/// Status only moves forward: `available` → `assigned` when the last slot
/// fills, `assigned` → `active` once both sides have signed.
pub struct ContractService {
    store: Arc<dyn ContractStore>,
    otp: Arc<dyn OtpRegistry>,
    clock: Arc<dyn Clock + Send + Sync>,
    locks: ContractLocks,
}

impl ContractService {
    pub fn new(
        store: Arc<dyn ContractStore>,
        otp: Arc<dyn OtpRegistry>,
        clock: Arc<dyn Clock + Send + Sync>,
        locks: ContractLocks,
    ) -> Self {
        Self {
            store,
            otp,
            clock,
            locks,
        }
    }

    /// Post a new contract to the marketplace.
    ///
    /// Posting counts as the contractor's signature, so `contractor_accepted_at`
    /// is stamped with the creation time.
    pub async fn create_contract(&self, input: NewContract) -> Result<Contract, AppError> {
        let contractor_id = input.contractor_id.trim();
        if contractor_id.is_empty() {
            return Err(AppError::validation("Contractor ID is required"));
        }
        let job_id = input.job_id.trim();
        if job_id.is_empty() {
            return Err(AppError::validation("Job ID is required"));
        }

        let daily_wage = input.daily_wage;
        if !daily_wage.is_finite() || daily_wage <= 0.0 || input.number_of_days <= 0 {
            return Err(AppError::validation("Invalid wage or days"));
        }
        let number_of_days = storable_count(input.number_of_days)
            .ok_or_else(|| AppError::validation("Invalid wage or days"))?;

        let workers_required = match input.workers_required {
            None | Some(0) => 1,
            Some(n) if n < 0 => {
                return Err(AppError::validation("Workers required must be at least 1"));
            }
            Some(n) => storable_count(n)
                .ok_or_else(|| AppError::validation("Workers required is too large"))?,
        };

        let now = self.clock.utc();
        let contract = Contract {
            id: generate_contract_id(now),
            job_id: job_id.to_owned(),
            contractor_id: contractor_id.to_owned(),
            contractor_name: input
                .contractor_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTRACTOR_NAME.to_string()),
            location: input
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            worker_id: None,
            enrolled_workers: Vec::new(),
            daily_wage,
            number_of_days,
            workers_required,
            workers_enrolled: 0,
            work_hours_per_day: input.work_hours_per_day.unwrap_or(DEFAULT_WORK_HOURS),
            overtime_rate_per_hour: input.overtime_rate_per_hour.unwrap_or(0.0),
            minimum_wage_alert: input.minimum_wage_alert.unwrap_or(false),
            total_contract_amount: input
                .total_contract_amount
                .unwrap_or(daily_wage * f64::from(number_of_days)),
            contractor_accepted_at: Some(now),
            worker_accepted_at: None,
            status: ContractStatus::Available,
            created_at: now,
            posted_at: now,
        };

        let contract = self.store.create(contract).await?;
        tracing::info!(
            contract_id = %contract.id,
            contractor_id = %contract.contractor_id,
            workers_required = contract.workers_required,
            "contract posted to marketplace"
        );
        Ok(contract)
    }

    /// Reserve one slot on an `available` contract for a worker.
    pub async fn enroll_worker(
        &self,
        contract_id: &str,
        enrollment: Enrollment,
    ) -> Result<EnrollOutcome, AppError> {
        let _guard = self.locks.acquire(contract_id).await;

        let contract = self.find(contract_id).await?;

        if contract.status != ContractStatus::Available {
            return Err(AppError::InvalidState(
                "Contract is not available for enrollment".to_string(),
            ));
        }
        if contract.is_enrolled(&enrollment.worker_id) {
            return Err(AppError::Conflict(
                "You have already enrolled in this contract".to_string(),
            ));
        }
        if contract.workers_enrolled >= contract.workers_required {
            return Err(AppError::Full(
                "No spots available - contract is full".to_string(),
            ));
        }

        let mut enrolled_workers = contract.enrolled_workers.clone();
        enrolled_workers.push(EnrolledWorker {
            worker_id: enrollment.worker_id.clone(),
            worker_name: enrollment.worker_name.clone(),
            worker_phone: enrollment.worker_phone,
            enrolled_at: self.clock.utc(),
            worker_accepted_at: None,
        });
        let workers_enrolled = contract.workers_enrolled + 1;

        let patch = ContractPatch {
            // First enrollee doubles as the single-worker legacy party.
            worker_id: contract
                .worker_id
                .is_none()
                .then(|| enrollment.worker_id.clone()),
            enrolled_workers: Some(enrolled_workers),
            workers_enrolled: Some(workers_enrolled),
            status: (workers_enrolled == contract.workers_required)
                .then_some(ContractStatus::Assigned),
            ..Default::default()
        };

        let updated = self.apply(contract_id, patch).await?;
        tracing::info!(
            contract_id,
            worker_id = %enrollment.worker_id,
            "worker {} enrolled ({}/{})",
            enrollment.worker_name,
            updated.workers_enrolled,
            updated.workers_required
        );

        Ok(EnrollOutcome {
            spots_remaining: updated.spots_remaining(),
            contract: updated,
        })
    }

    /// Record an OTP-verified signature from one side of the contract.
    ///
    /// The OTP is checked (and consumed) before the contract is looked up.
    pub async fn accept_contract(
        &self,
        contract_id: &str,
        phone_number: &str,
        otp_code: &str,
        party: Role,
    ) -> Result<AcceptOutcome, AppError> {
        if !self.otp.verify(phone_number, otp_code).await? {
            return Err(AppError::InvalidOtp);
        }

        let _guard = self.locks.acquire(contract_id).await;
        let contract = self.find(contract_id).await?;

        let now = self.clock.utc();
        let mut patch = ContractPatch::default();

        match party {
            Role::Contractor => {
                if contract.contractor_accepted_at.is_none() {
                    patch.contractor_accepted_at = Some(now);
                }
            }
            Role::Worker => {
                let mut enrolled_workers = contract.enrolled_workers.clone();
                if let Some(worker) = enrolled_workers
                    .iter_mut()
                    .find(|w| w.worker_phone == phone_number)
                {
                    worker.worker_accepted_at = Some(now);
                    patch.enrolled_workers = Some(enrolled_workers);
                }

                if contract.worker_accepted_at.is_none() && contract.worker_id.is_some() {
                    patch.worker_accepted_at = Some(now);
                }
            }
        }

        // Signatures accumulate across calls: fall back to what is already stored.
        let contractor_signed = patch
            .contractor_accepted_at
            .or(contract.contractor_accepted_at)
            .is_some();
        let worker_signed = patch
            .worker_accepted_at
            .or(contract.worker_accepted_at)
            .is_some();
        let both_signed = contractor_signed && worker_signed;

        let activated = both_signed && contract.status == ContractStatus::Assigned;
        if activated {
            patch.status = Some(ContractStatus::Active);
        }

        let updated = if patch.is_empty() {
            contract
        } else {
            self.apply(contract_id, patch).await?
        };

        tracing::info!(contract_id, party = %party, "contract accepted");
        if activated {
            tracing::info!(contract_id, "contract is now active");
        }

        let message = if updated.status == ContractStatus::Active {
            "Contract activated! Both parties have accepted.".to_string()
        } else if both_signed {
            format!("Contract accepted by {party}. Waiting for remaining workers to enroll.")
        } else {
            format!("Contract accepted by {party}. Waiting for other party.")
        };

        Ok(AcceptOutcome {
            contract: updated,
            activated,
            message,
        })
    }

    pub async fn get_contract(&self, contract_id: &str) -> Result<Contract, AppError> {
        self.find(contract_id).await
    }

    /// All contracts, newest first.
    pub async fn list_contracts(&self) -> Result<Vec<Contract>, AppError> {
        let mut contracts = self.store.list_all().await?;
        contracts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tracing::debug!(count = contracts.len(), "listed contracts");
        Ok(contracts)
    }

    /// CSV rendering of every stored contract, newest first.
    pub async fn export_csv(&self) -> Result<String, AppError> {
        let contracts = self.list_contracts().await?;
        Ok(export::contracts_to_csv(&contracts))
    }

    /// Today's date on the service clock, used to name export files.
    pub fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    async fn find(&self, contract_id: &str) -> Result<Contract, AppError> {
        self.store.get(contract_id).await?.ok_or_else(|| {
            tracing::info!(contract_id, "contract not found");
            AppError::NotFound("Contract not found".to_string())
        })
    }

    async fn apply(&self, contract_id: &str, patch: ContractPatch) -> Result<Contract, AppError> {
        self.store
            .update(contract_id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))
    }
}

/// Counts are stored as Postgres `INTEGER`, so anything past `i32::MAX` is refused.
fn storable_count(value: i64) -> Option<u32> {
    i32::try_from(value).ok().and_then(|v| u32::try_from(v).ok())
}

/// `contract-{unix millis}-{9 base36 chars}`.
fn generate_contract_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("contract-{}-{}", now.timestamp_millis(), suffix)
}
