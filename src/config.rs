use crate::storage::resolve_data_path;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8081/api/v1";
const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub api_url: String,
    pub api_token: Option<String>,
    pub api_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
            data_path: resolve_data_path(),
            api_url: env::var("WELLNESS_API_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_token: env::var("API_TOKEN").ok().filter(|value| !value.is_empty()),
            api_timeout: Duration::from_millis(
                parse_var("API_TIMEOUT_MS")
                    .filter(|ms| *ms > 0)
                    .unwrap_or(DEFAULT_API_TIMEOUT_MS),
            ),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse::<T>().ok())
}
