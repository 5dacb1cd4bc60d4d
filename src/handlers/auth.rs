use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::sync::Arc;

use super::present;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::users::Role;
use crate::otp::OtpRegistry;
use crate::services::UserDirectory;

/// POST /api/auth/login — resolve (phone, role) to a user, creating it on first login.
pub async fn login(
    users: web::Data<UserDirectory>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(name), Some(phone), Some(role)) =
        (present(body.name), present(body.phone), present(body.role))
    else {
        return Err(AppError::validation("Name, phone, and role are required"));
    };
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::validation("Invalid role. Must be worker or contractor"))?;

    let (user, created) = users.create_or_get(&name, &phone, role).await?;
    let message = if created {
        "New user created"
    } else {
        "Welcome back!"
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user,
        "message": message,
    })))
}

/// POST /api/auth/send-otp — issue a code for a phone number.
///
/// There is no SMS gateway, so the code is returned in the response.
pub async fn send_otp(
    config: web::Data<AppConfig>,
    otp: web::Data<Arc<dyn OtpRegistry>>,
    body: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let phone_number = present(body.into_inner().phone_number)
        .filter(|p| p.starts_with(&config.phone_prefix))
        .ok_or_else(|| AppError::validation("Invalid phone number format"))?;

    let code = otp.send(&phone_number).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "OTP sent successfully",
        "otp": code,
        "phone_number": phone_number,
    })))
}

/// POST /api/auth/signup — OTP-verified registration of a new account.
///
/// An existing account is refused before the code is checked, leaving it pending.
pub async fn signup(
    users: web::Data<UserDirectory>,
    otp: web::Data<Arc<dyn OtpRegistry>>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(phone_number), Some(otp_code), Some(name), Some(user_type)) = (
        present(body.phone_number),
        present(body.otp_code),
        present(body.name),
        present(body.user_type),
    ) else {
        return Err(AppError::validation("Missing required fields"));
    };
    let role =
        Role::parse(&user_type).ok_or_else(|| AppError::validation("Invalid user type"))?;

    if users.find(&phone_number, role).await?.is_some() {
        return Err(AppError::AlreadyExists(
            "User already exists. Please login.".to_string(),
        ));
    }

    if !otp.verify(&phone_number, &otp_code).await? {
        return Err(AppError::InvalidOtp);
    }

    let user = users.register(&name, &phone_number, role).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "user": user,
        "message": "Account created successfully",
    })))
}

// ── Request DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendOtpRequest {
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub phone_number: Option<String>,
    pub otp_code: Option<String>,
    pub name: Option<String>,
    pub user_type: Option<String>,
}
