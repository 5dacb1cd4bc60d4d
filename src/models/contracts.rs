use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract status stored as a lowercase string in the database.
///
/// `completed` and `disputed` exist for settlement flows outside this service;
/// no operation here moves a contract into them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Assigned => "assigned",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
        }
    }
}

/// SeaORM entity for the `contracts` table.
///
/// The enrolled worker list is kept as JSONB; see [`Contract`] for the typed view.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub job_id: String,
    pub contractor_id: String,
    pub contractor_name: String,
    pub location: String,
    pub worker_id: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub enrolled_workers: Json,
    #[sea_orm(column_type = "Double")]
    pub daily_wage: f64,
    pub number_of_days: i32,
    pub workers_required: i32,
    pub workers_enrolled: i32,
    #[sea_orm(column_type = "Double")]
    pub work_hours_per_day: f64,
    #[sea_orm(column_type = "Double")]
    pub overtime_rate_per_hour: f64,
    pub minimum_wage_alert: bool,
    #[sea_orm(column_type = "Double")]
    pub total_contract_amount: f64,
    pub contractor_accepted_at: Option<DateTimeUtc>,
    pub worker_accepted_at: Option<DateTimeUtc>,
    pub status: ContractStatus,
    pub created_at: DateTimeUtc,
    pub posted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── Domain types ──

/// A worker holding one of the contract's slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledWorker {
    pub worker_id: String,
    pub worker_name: String,
    pub worker_phone: String,
    pub enrolled_at: DateTime<Utc>,
    pub worker_accepted_at: Option<DateTime<Utc>>,
}

/// A job agreement between one contractor and one or more workers.
///
/// `worker_id` and `worker_accepted_at` are the single-worker fields kept for
/// older clients: the first enrollee fills `worker_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub job_id: String,
    pub contractor_id: String,
    pub contractor_name: String,
    pub location: String,
    pub worker_id: Option<String>,
    pub enrolled_workers: Vec<EnrolledWorker>,
    pub daily_wage: f64,
    pub number_of_days: u32,
    pub workers_required: u32,
    pub workers_enrolled: u32,
    pub work_hours_per_day: f64,
    pub overtime_rate_per_hour: f64,
    pub minimum_wage_alert: bool,
    pub total_contract_amount: f64,
    pub contractor_accepted_at: Option<DateTime<Utc>>,
    pub worker_accepted_at: Option<DateTime<Utc>>,
    #[serde(rename = "contract_status")]
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
    pub posted_at: DateTime<Utc>,
}

impl Contract {
    pub fn spots_remaining(&self) -> u32 {
        self.workers_required.saturating_sub(self.workers_enrolled)
    }

    pub fn is_enrolled(&self, worker_id: &str) -> bool {
        self.enrolled_workers.iter().any(|w| w.worker_id == worker_id)
    }

    /// Merge a patch into this record. Fields absent from the patch are untouched.
    pub fn apply(&mut self, patch: ContractPatch) {
        if let Some(worker_id) = patch.worker_id {
            self.worker_id = Some(worker_id);
        }
        if let Some(enrolled_workers) = patch.enrolled_workers {
            self.enrolled_workers = enrolled_workers;
        }
        if let Some(workers_enrolled) = patch.workers_enrolled {
            self.workers_enrolled = workers_enrolled;
        }
        if let Some(at) = patch.contractor_accepted_at {
            self.contractor_accepted_at = Some(at);
        }
        if let Some(at) = patch.worker_accepted_at {
            self.worker_accepted_at = Some(at);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial update for a stored contract.
///
/// Only enrollment and signature fields are patchable; the wage terms are fixed
/// once a contract is posted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractPatch {
    pub worker_id: Option<String>,
    pub enrolled_workers: Option<Vec<EnrolledWorker>>,
    pub workers_enrolled: Option<u32>,
    pub contractor_accepted_at: Option<DateTime<Utc>>,
    pub worker_accepted_at: Option<DateTime<Utc>>,
    pub status: Option<ContractStatus>,
}

impl ContractPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Row conversions ──

fn count_from_db(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn count_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl TryFrom<Model> for Contract {
    type Error = serde_json::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            enrolled_workers: serde_json::from_value(m.enrolled_workers)?,
            id: m.id,
            job_id: m.job_id,
            contractor_id: m.contractor_id,
            contractor_name: m.contractor_name,
            location: m.location,
            worker_id: m.worker_id,
            daily_wage: m.daily_wage,
            number_of_days: count_from_db(m.number_of_days),
            workers_required: count_from_db(m.workers_required),
            workers_enrolled: count_from_db(m.workers_enrolled),
            work_hours_per_day: m.work_hours_per_day,
            overtime_rate_per_hour: m.overtime_rate_per_hour,
            minimum_wage_alert: m.minimum_wage_alert,
            total_contract_amount: m.total_contract_amount,
            contractor_accepted_at: m.contractor_accepted_at,
            worker_accepted_at: m.worker_accepted_at,
            status: m.status,
            created_at: m.created_at,
            posted_at: m.posted_at,
        })
    }
}

impl TryFrom<Contract> for ActiveModel {
    type Error = serde_json::Error;

    fn try_from(c: Contract) -> Result<Self, Self::Error> {
        use sea_orm::ActiveValue::Set;

        Ok(Self {
            enrolled_workers: Set(serde_json::to_value(&c.enrolled_workers)?),
            id: Set(c.id),
            job_id: Set(c.job_id),
            contractor_id: Set(c.contractor_id),
            contractor_name: Set(c.contractor_name),
            location: Set(c.location),
            worker_id: Set(c.worker_id),
            daily_wage: Set(c.daily_wage),
            number_of_days: Set(count_to_db(c.number_of_days)),
            workers_required: Set(count_to_db(c.workers_required)),
            workers_enrolled: Set(count_to_db(c.workers_enrolled)),
            work_hours_per_day: Set(c.work_hours_per_day),
            overtime_rate_per_hour: Set(c.overtime_rate_per_hour),
            minimum_wage_alert: Set(c.minimum_wage_alert),
            total_contract_amount: Set(c.total_contract_amount),
            contractor_accepted_at: Set(c.contractor_accepted_at),
            worker_accepted_at: Set(c.worker_accepted_at),
            status: Set(c.status),
            created_at: Set(c.created_at),
            posted_at: Set(c.posted_at),
        })
    }
}

impl ActiveModel {
    /// Stage the fields present in `patch` on this active model.
    pub fn apply_patch(&mut self, patch: ContractPatch) -> Result<(), serde_json::Error> {
        use sea_orm::ActiveValue::Set;

        if let Some(worker_id) = patch.worker_id {
            self.worker_id = Set(Some(worker_id));
        }
        if let Some(enrolled_workers) = patch.enrolled_workers {
            self.enrolled_workers = Set(serde_json::to_value(&enrolled_workers)?);
        }
        if let Some(workers_enrolled) = patch.workers_enrolled {
            self.workers_enrolled = Set(count_to_db(workers_enrolled));
        }
        if let Some(at) = patch.contractor_accepted_at {
            self.contractor_accepted_at = Set(Some(at));
        }
        if let Some(at) = patch.worker_accepted_at {
            self.worker_accepted_at = Set(Some(at));
        }
        if let Some(status) = patch.status {
            self.status = Set(status);
        }
        Ok(())
    }
}

// ── DTOs ──

/// Validated input for posting a contract to the marketplace.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub contractor_id: String,
    pub contractor_name: Option<String>,
    pub job_id: String,
    pub location: Option<String>,
    pub daily_wage: f64,
    pub number_of_days: i64,
    pub workers_required: Option<i64>,
    pub work_hours_per_day: Option<f64>,
    pub overtime_rate_per_hour: Option<f64>,
    pub minimum_wage_alert: Option<bool>,
    pub total_contract_amount: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub worker_id: String,
    pub worker_name: String,
    pub worker_phone: String,
}
