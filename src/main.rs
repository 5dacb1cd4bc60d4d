use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use std::sync::Arc;
use suraksha_backend::handlers;
use suraksha_backend::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env();
    let port = config.port;

    let state = AppState::from_config(config, Arc::new(mockable::DefaultClock))
        .await
        .expect("Failed to initialise storage backends");

    let bind_addr = format!("0.0.0.0:{port}");
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let state = state.clone();
        App::new().wrap(cors).service(
            web::scope("/api")
                .configure(|cfg| state.configure(cfg))
                .configure(handlers::init_routes),
        )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
