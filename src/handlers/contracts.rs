use actix_web::{HttpResponse, http::header, web};
use serde::{Deserialize, Serialize};

use super::present;
use crate::error::AppError;
use crate::models::contracts::{Contract, ContractStatus, Enrollment, NewContract};
use crate::models::users::Role;
use crate::services::ContractService;
use crate::services::export::export_filename;

/// POST /api/contracts/create — a contractor posts a contract to the marketplace.
pub async fn create_contract(
    contracts: web::Data<ContractService>,
    body: web::Json<CreateContractRequest>,
) -> Result<HttpResponse, AppError> {
    let input = NewContract::try_from(body.into_inner())?;
    let contract = contracts.create_contract(input).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "contract": contract,
        "message": "Contract posted to marketplace successfully!",
    })))
}

/// POST /api/contracts/assign — a worker takes one of the open slots.
pub async fn assign_contract(
    contracts: web::Data<ContractService>,
    body: web::Json<AssignContractRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(contract_id), Some(worker_id), Some(worker_name), Some(worker_phone)) = (
        present(body.contract_id),
        present(body.worker_id),
        present(body.worker_name),
        present(body.worker_phone),
    ) else {
        return Err(AppError::validation(
            "Contract ID, Worker ID, name, and phone are required",
        ));
    };

    let outcome = contracts
        .enroll_worker(
            &contract_id,
            Enrollment {
                worker_id,
                worker_name,
                worker_phone,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "contract": outcome.contract,
        "spots_remaining": outcome.spots_remaining,
        "message": "Enrolled successfully! Now sign with OTP to confirm.",
    })))
}

/// POST /api/contracts/accept — OTP-signed acceptance by a worker or the contractor.
pub async fn accept_contract(
    contracts: web::Data<ContractService>,
    body: web::Json<AcceptContractRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(contract_id), Some(phone_number), Some(otp_code), Some(user_type)) = (
        present(body.contract_id),
        present(body.phone_number),
        present(body.otp_code),
        present(body.user_type),
    ) else {
        return Err(AppError::validation("Missing required fields"));
    };
    let party =
        Role::parse(&user_type).ok_or_else(|| AppError::validation("Invalid user type"))?;

    let outcome = contracts
        .accept_contract(&contract_id, &phone_number, &otp_code, party)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "contract": outcome.contract,
        "message": outcome.message,
    })))
}

/// GET /api/contracts/{id} — a single contract with its job card.
pub async fn get_contract(
    contracts: web::Data<ContractService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let contract = contracts.get_contract(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "contract": ContractWithJob::<JobDetail>::detail(contract),
    })))
}

/// GET /api/contracts/list — every contract, newest first.
pub async fn list_contracts(
    contracts: web::Data<ContractService>,
) -> Result<HttpResponse, AppError> {
    let listed: Vec<_> = contracts
        .list_contracts()
        .await?
        .into_iter()
        .map(ContractWithJob::<JobSummary>::summary)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "contracts": listed,
    })))
}

/// GET /api/contracts/export — CSV download of all contracts.
pub async fn export_contracts(
    contracts: web::Data<ContractService>,
) -> Result<HttpResponse, AppError> {
    let csv = contracts.export_csv().await?;
    let filename = export_filename(contracts.today());

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(csv))
}

// ── Request DTOs ──

/// Request body for POST /api/contracts/create.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContractRequest {
    pub contractor_id: Option<String>,
    pub contractor_name: Option<String>,
    pub job_id: Option<String>,
    pub location: Option<String>,
    pub daily_wage: Option<f64>,
    pub number_of_days: Option<i64>,
    pub workers_required: Option<i64>,
    pub work_hours_per_day: Option<f64>,
    pub overtime_rate_per_hour: Option<f64>,
    pub minimum_wage_alert: Option<bool>,
    pub total_contract_amount: Option<f64>,
}

impl TryFrom<CreateContractRequest> for NewContract {
    type Error = AppError;

    fn try_from(req: CreateContractRequest) -> Result<Self, Self::Error> {
        let contractor_id = present(req.contractor_id)
            .ok_or_else(|| AppError::validation("Contractor ID is required"))?;
        let job_id =
            present(req.job_id).ok_or_else(|| AppError::validation("Job ID is required"))?;
        let (Some(daily_wage), Some(number_of_days)) = (req.daily_wage, req.number_of_days)
        else {
            return Err(AppError::validation("Invalid wage or days"));
        };

        Ok(Self {
            contractor_id,
            contractor_name: present(req.contractor_name),
            job_id,
            location: present(req.location),
            daily_wage,
            number_of_days,
            workers_required: req.workers_required,
            work_hours_per_day: req.work_hours_per_day,
            overtime_rate_per_hour: req.overtime_rate_per_hour,
            minimum_wage_alert: req.minimum_wage_alert,
            total_contract_amount: req.total_contract_amount,
        })
    }
}

/// Request body for POST /api/contracts/assign.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignContractRequest {
    pub contract_id: Option<String>,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub worker_phone: Option<String>,
}

/// Request body for POST /api/contracts/accept.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptContractRequest {
    pub contract_id: Option<String>,
    pub phone_number: Option<String>,
    pub otp_code: Option<String>,
    pub user_type: Option<String>,
}

// ── Response views ──

/// A contract plus the job card shown next to it.
///
/// Jobs are not stored by this service yet, so the card carries fixed display
/// values keyed by the contract's `job_id`.
#[derive(Debug, Serialize)]
pub struct ContractWithJob<J> {
    #[serde(flatten)]
    pub contract: Contract,
    pub jobs: J,
}

#[derive(Debug, Serialize)]
pub struct JobDetail {
    pub id: String,
    pub job_title: &'static str,
    pub skill_required: &'static str,
    pub location_address: &'static str,
    pub status: &'static str,
    pub contractor: PartyContact,
    pub worker: PartyContact,
}

#[derive(Debug, Serialize)]
pub struct PartyContact {
    pub id: &'static str,
    pub name: &'static str,
    pub phone_number: &'static str,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub job_title: &'static str,
    pub skill_required: &'static str,
    pub location: &'static str,
    pub contractor: ContactSummary,
}

#[derive(Debug, Serialize)]
pub struct ContactSummary {
    pub name: &'static str,
    pub phone: &'static str,
}

impl ContractWithJob<JobDetail> {
    pub fn detail(contract: Contract) -> Self {
        let status = if contract.status == ContractStatus::Active {
            "active"
        } else {
            "pending"
        };
        let jobs = JobDetail {
            id: contract.job_id.clone(),
            job_title: "Construction Work",
            skill_required: "Mason (Rajmistri)",
            location_address: "Sector 15, Navi Mumbai, Maharashtra",
            status,
            contractor: PartyContact {
                id: "contractor-1",
                name: "Raj Kumar",
                phone_number: "+919876543210",
            },
            worker: PartyContact {
                id: "worker-1",
                name: "Ramesh Kumar",
                phone_number: "+919876543211",
            },
        };
        Self { contract, jobs }
    }
}

impl ContractWithJob<JobSummary> {
    pub fn summary(contract: Contract) -> Self {
        let jobs = JobSummary {
            job_id: contract.job_id.clone(),
            job_title: "Construction Work - Mason",
            skill_required: "Masonry",
            location: "Navi Mumbai",
            contractor: ContactSummary {
                name: "Contractor",
                phone: "+919876543210",
            },
        };
        Self { contract, jobs }
    }
}
