use std::time::Duration;

use crate::otp::DEFAULT_OTP_TTL;

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres for users and contracts; in-memory when unset.
    pub database_url: Option<String>,
    /// Redis for pending OTPs; in-memory when unset.
    pub redis_url: Option<String>,
    pub otp_ttl: Duration,
    /// Country-code prefix every OTP phone number must carry.
    pub phone_prefix: String,
    pub contract_lock_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            redis_url: None,
            otp_ttl: DEFAULT_OTP_TTL,
            phone_prefix: "+91".to_string(),
            contract_lock_idle: Duration::from_secs(600), // 10 minutes
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url: non_empty_var("DATABASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
            otp_ttl: parse_duration_secs("OTP_TTL_SECS", defaults.otp_ttl.as_secs()),
            phone_prefix: non_empty_var("OTP_PHONE_PREFIX").unwrap_or(defaults.phone_prefix),
            contract_lock_idle: parse_duration_secs(
                "CONTRACT_LOCK_IDLE_SECS",
                defaults.contract_lock_idle.as_secs(),
            ),
        }
    }
}

fn non_empty_var(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_five_minute_otp_window() {
        let config = AppConfig::default();
        assert_eq!(config.otp_ttl, Duration::from_secs(300));
        assert_eq!(config.phone_prefix, "+91");
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn unparseable_durations_fall_back() {
        assert_eq!(
            parse_duration_secs("SURAKSHA_TEST_UNSET_DURATION", 42),
            Duration::from_secs(42)
        );
    }
}
