//! Runtime configuration.
//!
//! Values come from the process environment (with `.env` support) and can be
//! overridden by CLI flags in `app`. Parsing is written against a key lookup so
//! it can be exercised without touching the real environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://aoe4world.com/api/v0";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9999";
pub const DEFAULT_MAX_PAGES: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5000",
    "http://localhost:8080",
    "http://localhost:3000",
    "https://api.when-will-i-be-conqueror.com",
    "https://www.when-will-i-be-conqueror.com",
    "https://when-will-i-be-conqueror.com",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    /// Earliest match start (Unix seconds) that belongs to the current season.
    pub season_start: f64,
    /// Directory for `game_data_<name>.json` dumps and `log.txt`.
    pub data_dir: PathBuf,
    pub base_url: String,
    /// Pagination bound; `None` trusts upstream paging completely.
    pub max_pages: Option<u32>,
    pub upstream_timeout: Duration,
    /// Abort the request when the raw dump cannot be written.
    pub strict_dump: bool,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

impl TrendConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_start = get("SEASON_START_TIMESTAMP")
            .ok_or_else(|| AppError::config("SEASON_START_TIMESTAMP is not set"))?;
        let season_start = raw_start
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                AppError::config(format!("Failed to parse SEASON_START_TIMESTAMP '{raw_start}'"))
            })?;

        let max_pages = match get("MAX_PAGES") {
            None => Some(DEFAULT_MAX_PAGES),
            Some(raw) => {
                let n = raw
                    .parse::<u32>()
                    .map_err(|e| AppError::config(format!("Invalid MAX_PAGES '{raw}': {e}")))?;
                (n > 0).then_some(n)
            }
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::config(format!("Invalid UPSTREAM_TIMEOUT_SECS '{raw}': {e}"))
            })?,
        };

        let strict_dump = match get("STRICT_DUMP") {
            None => false,
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| AppError::config(format!("Invalid STRICT_DUMP '{raw}'")))?,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        };

        Ok(Self {
            season_start,
            data_dir: PathBuf::from(get("APPDATA_PATH").unwrap_or_else(|| ".".to_string())),
            base_url: get("AOE4WORLD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_pages,
            upstream_timeout: Duration::from_secs(timeout_secs),
            strict_dump,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_origins,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("log.txt")
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
