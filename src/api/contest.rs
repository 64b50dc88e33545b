//! Adapter for the contest-scoped backend API generation.
//!
//! This generation nests everything under `/contests/{id}/...`, encodes
//! instants as ISO-8601 strings and durations as `H:MM:SS[.fff]`, groups
//! teams via group records with a sort order, and reports judgements with
//! short type ids (`AC`, `WA`, ...).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::client::ApiClient;
use super::reltime::parse_reltime;
use super::{flags_from_config, id_string, ScoreboardSource};
use crate::constants::SYSTEM_NAME;
use crate::error::{FeedError, FeedResult};
use crate::models::{BackendFlags, Contest, Judgement, Problem, Submission, SystemInfo, Team};

/// Fetch adapter speaking the contest-scoped API generation.
pub struct ContestApi {
    client: ApiClient,
    cid: String,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    domjudge_version: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContest {
    #[serde(default)]
    formal_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    start_time: String,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    scoreboard_freeze_duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    id: Value,
    sortorder: i64,
}

#[derive(Debug, Deserialize)]
struct RawOrganization {
    id: Value,
    #[serde(default)]
    formal_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: Value,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    organization_id: Option<Value>,
    #[serde(default)]
    group_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    id: Value,
    label: String,
    name: String,
    #[serde(default)]
    rgb: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: Value,
    team_id: Value,
    problem_id: Value,
    #[serde(default)]
    contest_time: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawJudgement {
    submission_id: Value,
    #[serde(default)]
    judgement_type_id: Option<String>,
    #[serde(default)]
    valid: Option<bool>,
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn normalize_contest(cid: &str, raw: RawContest) -> FeedResult<Contest> {
    let start = parse_instant(&raw.start_time).ok_or_else(|| FeedError::MalformedField {
        field: "contest start_time",
        value: raw.start_time.clone(),
    })?;

    // Prefer the explicit end instant, otherwise derive it from the duration.
    let end = match (&raw.end_time, &raw.duration) {
        (Some(end_time), _) => parse_instant(end_time).ok_or_else(|| FeedError::MalformedField {
            field: "contest end_time",
            value: end_time.clone(),
        })?,
        (None, Some(duration)) => {
            let length = parse_reltime(duration).ok_or_else(|| FeedError::MalformedField {
                field: "contest duration",
                value: duration.clone(),
            })?;
            start + length
        }
        (None, None) => {
            return Err(FeedError::MalformedField {
                field: "contest end",
                value: "missing end_time and duration".to_string(),
            });
        }
    };

    let freeze_duration = match &raw.scoreboard_freeze_duration {
        Some(freeze) => Some(parse_reltime(freeze).ok_or_else(|| FeedError::MalformedField {
            field: "scoreboard_freeze_duration",
            value: freeze.clone(),
        })?),
        None => None,
    };

    Ok(Contest {
        id: cid.to_string(),
        title: raw
            .formal_name
            .or(raw.name)
            .unwrap_or_else(|| cid.to_string()),
        start,
        end,
        freeze_duration,
        // This generation exposes no unfreeze instant; only the static
        // configuration can force-unfreeze.
        unfreeze_at: None,
    })
}

fn normalize_team(
    raw: RawTeam,
    sortorders: &HashMap<String, i64>,
    affiliations: &HashMap<String, String>,
) -> Option<Team> {
    let id = id_string(&raw.id)?;

    // A team can sit in several groups; the lowest sort order decides its
    // public visibility tier.
    let sortorder = raw
        .group_ids
        .iter()
        .filter_map(id_string)
        .filter_map(|gid| sortorders.get(&gid).copied())
        .min();
    let Some(sortorder) = sortorder else {
        tracing::debug!("Team {} belongs to no known group", id);
        return None;
    };

    let affiliation = raw
        .organization_id
        .as_ref()
        .and_then(id_string)
        .and_then(|oid| affiliations.get(&oid).cloned());

    Some(Team {
        name: raw.display_name.or(raw.name).unwrap_or_else(|| id.clone()),
        id,
        affiliation,
        sortorder,
    })
}

fn normalize_submission(raw: RawSubmission, start: DateTime<Utc>) -> Option<Submission> {
    let id = id_string(&raw.id)?;

    let submitted_at = match (&raw.contest_time, &raw.time) {
        (Some(contest_time), _) => match parse_reltime(contest_time) {
            Some(offset) => Some(start + offset),
            None => None,
        },
        (None, Some(time)) => parse_instant(time),
        (None, None) => None,
    };
    let Some(submitted_at) = submitted_at else {
        tracing::warn!(
            "Skipping submission {}: unparseable time {:?}/{:?}",
            id,
            raw.contest_time,
            raw.time
        );
        return None;
    };

    Some(Submission {
        id,
        team_id: id_string(&raw.team_id)?,
        problem_id: id_string(&raw.problem_id)?,
        submitted_at,
    })
}

impl ContestApi {
    pub fn new(client: ApiClient, cid: String) -> Self {
        Self { client, cid }
    }

    fn scoped(&self, resource: &str) -> String {
        format!("contests/{}/{}", self.cid, resource)
    }
}

#[async_trait]
impl ScoreboardSource for ContestApi {
    async fn fetch_flags(&self) -> FeedResult<BackendFlags> {
        let config: serde_json::Map<String, Value> = self.client.get_json("config", &[]).await?;
        Ok(flags_from_config(&config))
    }

    async fn fetch_system_info(&self) -> FeedResult<SystemInfo> {
        let info: RawInfo = self.client.get_json("info", &[]).await?;
        Ok(SystemInfo {
            name: SYSTEM_NAME.to_string(),
            version: info.domjudge_version.or(info.version).unwrap_or_default(),
        })
    }

    async fn fetch_contest(&self) -> FeedResult<Contest> {
        let path = format!("contests/{}", self.cid);
        let raw: RawContest = match self.client.get_json(&path, &[]).await {
            Ok(raw) => raw,
            Err(FeedError::Fetch(e)) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
                return Err(FeedError::ContestNotFound(self.cid.clone()));
            }
            Err(e) => return Err(e),
        };
        normalize_contest(&self.cid, raw)
    }

    async fn fetch_teams(&self) -> FeedResult<Vec<Team>> {
        let groups_path = self.scoped("groups");
        let organizations_path = self.scoped("organizations");
        let teams_path = self.scoped("teams");
        let (groups, organizations, teams): (Vec<RawGroup>, Vec<RawOrganization>, Vec<RawTeam>) =
            tokio::try_join!(
                self.client.get_json(&groups_path, &[]),
                self.client.get_json(&organizations_path, &[]),
                self.client.get_json(&teams_path, &[]),
            )?;

        let sortorders: HashMap<String, i64> = groups
            .iter()
            .filter_map(|g| Some((id_string(&g.id)?, g.sortorder)))
            .collect();
        let affiliations: HashMap<String, String> = organizations
            .into_iter()
            .filter_map(|o| {
                let id = id_string(&o.id)?;
                Some((id, o.formal_name.or(o.name)?))
            })
            .collect();

        Ok(teams
            .into_iter()
            .filter_map(|raw| normalize_team(raw, &sortorders, &affiliations))
            .collect())
    }

    async fn fetch_problems(&self) -> FeedResult<Vec<Problem>> {
        let problems: Vec<RawProblem> = self.client.get_json(&self.scoped("problems"), &[]).await?;

        Ok(problems
            .into_iter()
            .filter_map(|raw| {
                Some(Problem {
                    id: id_string(&raw.id)?,
                    short_name: raw.label,
                    title: raw.name,
                    color: raw.rgb.or(raw.color).filter(|c| !c.is_empty()),
                })
            })
            .collect())
    }

    async fn fetch_submissions(&self) -> FeedResult<Vec<Submission>> {
        // The contest start is needed to resolve relative submission times.
        let submissions_path = self.scoped("submissions");
        let (contest, submissions): (Contest, Vec<RawSubmission>) = tokio::try_join!(
            self.fetch_contest(),
            self.client.get_json(&submissions_path, &[]),
        )?;

        Ok(submissions
            .into_iter()
            .filter_map(|raw| normalize_submission(raw, contest.start))
            .collect())
    }

    async fn fetch_judgements(&self) -> FeedResult<Vec<Judgement>> {
        let judgements: Vec<RawJudgement> =
            self.client.get_json(&self.scoped("judgements"), &[]).await?;

        Ok(judgements
            .into_iter()
            .filter_map(|raw| {
                Some(Judgement {
                    submission_id: id_string(&raw.submission_id)?,
                    valid: raw.valid.unwrap_or(true),
                    outcome: raw.judgement_type_id.filter(|o| !o.is_empty()),
                })
            })
            .collect())
    }
}
