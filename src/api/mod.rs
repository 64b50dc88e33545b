//! Fetch adapters towards the judging backend.
//!
//! The backend API has shipped in several generations with different record
//! shapes and time encodings. Each generation gets its own adapter behind
//! the [`ScoreboardSource`] trait; everything downstream consumes only the
//! normalized records from [`crate::models`].

mod client;
mod contest;
mod legacy;
mod reltime;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{FeedError, FeedResult};
use crate::models::{BackendFlags, Contest, Judgement, Problem, Submission, SystemInfo, Team};

pub use client::ApiClient;
pub use contest::ContestApi;
pub use legacy::LegacyApi;
pub use reltime::parse_reltime;

/// Read-only view of the backend state needed to build one snapshot.
///
/// All calls are independent of each other and safe to run concurrently;
/// each returns an immutable result for the current cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreboardSource: Send + Sync {
    /// Backend behaviour flags (`compile_penalty`, `show_pending`).
    async fn fetch_flags(&self) -> FeedResult<BackendFlags>;

    /// Backend name and version for the contest document.
    async fn fetch_system_info(&self) -> FeedResult<SystemInfo>;

    /// The target contest, with timing fields normalized.
    async fn fetch_contest(&self) -> FeedResult<Contest>;

    /// All teams, each with its category sort order resolved.
    async fn fetch_teams(&self) -> FeedResult<Vec<Team>>;

    /// The contest's problems.
    async fn fetch_problems(&self) -> FeedResult<Vec<Problem>>;

    /// Raw submissions in backend return order.
    async fn fetch_submissions(&self) -> FeedResult<Vec<Submission>>;

    /// Judgements in backend return order.
    async fn fetch_judgements(&self) -> FeedResult<Vec<Judgement>>;
}

/// Backend API generation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Flat endpoints, epoch-second timestamps, `?cid=` query filtering.
    Legacy,
    /// Contest-scoped endpoints, ISO-8601 instants and `H:MM:SS` durations.
    Contest,
}

impl FromStr for ApiGeneration {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(ApiGeneration::Legacy),
            "contest" => Ok(ApiGeneration::Contest),
            other => Err(FeedError::Config(format!(
                "unknown API generation '{other}' (expected 'legacy' or 'contest')"
            ))),
        }
    }
}

/// Build the fetch adapter for the configured backend generation.
pub fn build_source(config: &Config) -> FeedResult<Arc<dyn ScoreboardSource>> {
    let client = ApiClient::new(
        &config.api.base_url,
        config.api.username.clone(),
        config.api.password.clone(),
        Duration::from_millis(config.api.timeout_ms),
    )?;

    Ok(match config.api.generation {
        ApiGeneration::Legacy => Arc::new(LegacyApi::new(
            client,
            config.filter.contest_id.clone(),
            config.api.system_version.clone(),
        )),
        ApiGeneration::Contest => Arc::new(ContestApi::new(client, config.filter.contest_id.clone())),
    })
}

/// Interpret a backend config value as a boolean.
///
/// Backend generations disagree on the encoding: some report real booleans,
/// others 0/1 integers.
pub(crate) fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Decode the backend flags out of a `GET config` response body.
pub(crate) fn flags_from_config(config: &serde_json::Map<String, serde_json::Value>) -> BackendFlags {
    BackendFlags {
        compile_penalty: truthy(config.get("compile_penalty")),
        show_pending: truthy(config.get("show_pending")),
    }
}

/// Render a backend identifier (number or string) as a string key.
///
/// Generations disagree on identifier types, so everything is normalized to
/// strings before leaving the adapter layer.
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
