pub mod auth;
pub mod contracts;

use actix_web::web;

use crate::error::AppError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    // ── Auth routes ──
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/send-otp", web::post().to(auth::send_otp))
            .route("/signup", web::post().to(auth::signup)),
    );

    // ── Contract routes (static paths before `/{id}`) ──
    cfg.service(
        web::scope("/contracts")
            .route("/create", web::post().to(contracts::create_contract))
            .route("/assign", web::post().to(contracts::assign_contract))
            .route("/accept", web::post().to(contracts::accept_contract))
            .route("/list", web::get().to(contracts::list_contracts))
            .route("/export", web::get().to(contracts::export_contracts))
            .route("/{id}", web::get().to(contracts::get_contract)),
    );
}

/// Reject unparseable bodies with the same `{"error": ...}` envelope as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::validation(format!("Invalid request body: {err}")).into()
    })
}

/// Trimmed, non-empty value of an optional text field.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
