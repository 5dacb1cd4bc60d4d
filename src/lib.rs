pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod otp;
pub mod services;
pub mod state;
pub mod test_support;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;
