//! Adapter for the legacy flat backend API.
//!
//! This generation serves flat endpoints (`/contests`, `/teams`, ...) with
//! `?cid=` query filtering, encodes every instant as epoch seconds (floats,
//! sub-second precision included) and calls judgement records "judgings".

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::client::ApiClient;
use super::{flags_from_config, id_string, truthy, ScoreboardSource};
use crate::constants::SYSTEM_NAME;
use crate::error::{FeedError, FeedResult};
use crate::models::{BackendFlags, Contest, Judgement, Problem, Submission, SystemInfo, Team};

/// Fetch adapter speaking the legacy API generation.
pub struct LegacyApi {
    client: ApiClient,
    cid: String,
    /// This generation has no version endpoint, so the reported version is
    /// taken from configuration.
    system_version: String,
}

#[derive(Debug, Deserialize)]
struct RawContest {
    name: String,
    start: f64,
    end: f64,
    #[serde(default)]
    freeze: Option<f64>,
    #[serde(default)]
    unfreeze: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    categoryid: i64,
    sortorder: i64,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: Value,
    name: String,
    #[serde(default)]
    affiliation: Option<String>,
    category: i64,
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    id: Value,
    short_name: String,
    name: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: Value,
    team: Value,
    problem: Value,
    time: f64,
}

#[derive(Debug, Deserialize)]
struct RawJudging {
    submission: Value,
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default)]
    valid: Option<Value>,
}

/// Convert epoch seconds (possibly fractional) to an instant.
fn from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, (seconds.fract() * 1e9) as u32)
}

fn normalize_contest(cid: &str, raw: RawContest) -> FeedResult<Contest> {
    let start = from_epoch(raw.start).ok_or(FeedError::MalformedField {
        field: "contest start",
        value: raw.start.to_string(),
    })?;
    let end = from_epoch(raw.end).ok_or(FeedError::MalformedField {
        field: "contest end",
        value: raw.end.to_string(),
    })?;

    // Freeze arrives as an absolute instant; normalize to a window length.
    let freeze_duration = match raw.freeze {
        Some(epoch) => {
            let freeze_at = from_epoch(epoch).ok_or(FeedError::MalformedField {
                field: "contest freeze",
                value: epoch.to_string(),
            })?;
            Some(end - freeze_at)
        }
        None => None,
    };

    Ok(Contest {
        id: cid.to_string(),
        title: raw.name,
        start,
        end,
        freeze_duration,
        unfreeze_at: raw.unfreeze.and_then(from_epoch),
    })
}

fn normalize_team(raw: RawTeam, sortorders: &HashMap<i64, i64>) -> Option<Team> {
    let id = id_string(&raw.id)?;
    let Some(&sortorder) = sortorders.get(&raw.category) else {
        tracing::debug!("Team {} references unknown category {}", id, raw.category);
        return None;
    };

    Some(Team {
        id,
        name: raw.name,
        affiliation: raw.affiliation.filter(|a| !a.is_empty()),
        sortorder,
    })
}

fn normalize_submission(raw: RawSubmission) -> Option<Submission> {
    let id = id_string(&raw.id)?;
    let Some(submitted_at) = from_epoch(raw.time) else {
        tracing::warn!("Skipping submission {}: unparseable time {}", id, raw.time);
        return None;
    };

    Some(Submission {
        id,
        team_id: id_string(&raw.team)?,
        problem_id: id_string(&raw.problem)?,
        submitted_at,
    })
}

fn normalize_judging(raw: RawJudging) -> Option<Judgement> {
    Some(Judgement {
        submission_id: id_string(&raw.submission)?,
        // Absent validity means the record was never superseded.
        valid: raw.valid.as_ref().map(|v| truthy(Some(v))).unwrap_or(true),
        outcome: raw.outcome.filter(|o| !o.is_empty()),
    })
}

impl LegacyApi {
    pub fn new(client: ApiClient, cid: String, system_version: String) -> Self {
        Self {
            client,
            cid,
            system_version,
        }
    }

    fn cid_query(&self) -> [(&'static str, String); 1] {
        [("cid", self.cid.clone())]
    }
}

#[async_trait]
impl ScoreboardSource for LegacyApi {
    async fn fetch_flags(&self) -> FeedResult<BackendFlags> {
        let config: serde_json::Map<String, Value> = self.client.get_json("config", &[]).await?;
        Ok(flags_from_config(&config))
    }

    async fn fetch_system_info(&self) -> FeedResult<SystemInfo> {
        Ok(SystemInfo {
            name: SYSTEM_NAME.to_string(),
            version: self.system_version.clone(),
        })
    }

    async fn fetch_contest(&self) -> FeedResult<Contest> {
        let mut contests: HashMap<String, RawContest> =
            self.client.get_json("contests", &[]).await?;
        let raw = contests
            .remove(&self.cid)
            .ok_or_else(|| FeedError::ContestNotFound(self.cid.clone()))?;
        normalize_contest(&self.cid, raw)
    }

    async fn fetch_teams(&self) -> FeedResult<Vec<Team>> {
        let public = [("public", "true".to_string())];
        let (categories, teams): (Vec<RawCategory>, Vec<RawTeam>) = tokio::try_join!(
            self.client.get_json("categories", &public),
            self.client.get_json("teams", &public),
        )?;

        let sortorders: HashMap<i64, i64> = categories
            .into_iter()
            .map(|c| (c.categoryid, c.sortorder))
            .collect();

        Ok(teams
            .into_iter()
            .filter_map(|raw| normalize_team(raw, &sortorders))
            .collect())
    }

    async fn fetch_problems(&self) -> FeedResult<Vec<Problem>> {
        let problems: Vec<RawProblem> =
            self.client.get_json("problems", &self.cid_query()).await?;

        Ok(problems
            .into_iter()
            .filter_map(|raw| {
                Some(Problem {
                    id: id_string(&raw.id)?,
                    short_name: raw.short_name,
                    title: raw.name,
                    color: raw.color.filter(|c| !c.is_empty()),
                })
            })
            .collect())
    }

    async fn fetch_submissions(&self) -> FeedResult<Vec<Submission>> {
        let submissions: Vec<RawSubmission> =
            self.client.get_json("submissions", &self.cid_query()).await?;
        Ok(submissions.into_iter().filter_map(normalize_submission).collect())
    }

    async fn fetch_judgements(&self) -> FeedResult<Vec<Judgement>> {
        let judgings: Vec<RawJudging> =
            self.client.get_json("judgings", &self.cid_query()).await?;
        Ok(judgings.into_iter().filter_map(normalize_judging).collect())
    }
}
