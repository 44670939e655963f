use crate::HealthLogError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub api_token: Option<SecretString>,
    pub user_id: Option<i64>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, HealthLogError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, HealthLogError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("HEALTHLOG_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let api_token = get("HEALTHLOG_API_TOKEN")
            .filter(|s| !s.is_empty())
            .map(|t| SecretString::new(t.into()));
        let user_id = match get("HEALTHLOG_USER_ID").filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                HealthLogError::Config(format!("HEALTHLOG_USER_ID is not a number: {raw}"))
            })?),
            None => None,
        };
        let timeout_secs = match get("HEALTHLOG_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                HealthLogError::Config(format!("HEALTHLOG_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            api_token,
            user_id,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
