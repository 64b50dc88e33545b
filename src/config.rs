//! Application configuration management
//!
//! All configuration is loaded from environment variables at startup and
//! handed to the pipeline explicitly; there is no process-wide mutable
//! configuration state.

use std::env;
use std::path::PathBuf;

use crate::api::ApiGeneration;
use crate::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_OUTPUT_DIR, DEFAULT_SORTORDER};
use crate::error::{FeedError, FeedResult};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
    pub schedule: ScheduleConfig,
}

/// Backend API connection configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend API base URL, without a trailing slash
    pub base_url: String,

    /// HTTP basic credentials (jury-level account)
    pub username: Option<String>,
    pub password: Option<String>,

    /// Backend API generation to speak
    pub generation: ApiGeneration,

    /// Per-fetch timeout in milliseconds
    pub timeout_ms: u64,

    /// Backend version string reported in the contest document when the
    /// backend generation cannot report one itself
    pub system_version: String,
}

/// Snapshot filtering configuration
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Target contest id
    pub contest_id: String,

    /// Team category sort order considered publicly visible
    pub sortorder: i64,

    /// Force the scoreboard unfrozen regardless of contest timing, e.g. to
    /// collect a final run list privately
    pub force_unfreeze: bool,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Directory the snapshot documents are written into
    pub dest: PathBuf,
}

/// Polling configuration
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Interval between cycles in milliseconds; `None` runs a single cycle
    pub interval_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> FeedResult<Self> {
        let base_url = env::var("DOMJUDGE_API_URL")
            .map_err(|_| FeedError::Config("DOMJUDGE_API_URL must be set".to_string()))?;
        let contest_id = env::var("CONTEST_ID")
            .map_err(|_| FeedError::Config("CONTEST_ID must be set".to_string()))?;

        let generation = match env::var("DOMJUDGE_API_GENERATION") {
            Ok(value) => value.parse()?,
            Err(_) => ApiGeneration::Contest,
        };

        Ok(Self {
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                username: env::var("DOMJUDGE_USERNAME").ok(),
                password: env::var("DOMJUDGE_PASSWORD").ok(),
                generation,
                timeout_ms: env::var("FETCH_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS),
                system_version: env::var("DOMJUDGE_VERSION").unwrap_or_default(),
            },
            filter: FilterConfig {
                contest_id,
                sortorder: env::var("TEAM_SORTORDER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SORTORDER),
                force_unfreeze: env::var("FORCE_UNFREEZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(false),
            },
            output: OutputConfig {
                dest: PathBuf::from(
                    env::var("OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
                ),
            },
            schedule: ScheduleConfig {
                interval_ms: env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()),
            },
        })
    }
}
