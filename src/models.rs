//! Normalized backend records shared across the pipeline.
//!
//! Fetch adapters translate whatever shape their backend generation returns
//! into these records; nothing downstream of the adapter ever sees a raw
//! response body.

use chrono::{DateTime, Duration, Utc};

/// A contest as fetched for one cycle. Timing fields may change between
/// cycles (e.g. an admin extends the contest), so this is re-fetched fresh
/// every time.
#[derive(Debug, Clone, PartialEq)]
pub struct Contest {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Length of the trailing scoreboard-freeze window, if the contest
    /// freezes at all.
    pub freeze_duration: Option<Duration>,
    /// Instant at which the backend wants the scoreboard unfrozen again.
    /// Only some backend generations carry this.
    pub unfreeze_at: Option<DateTime<Utc>>,
}

impl Contest {
    /// Total contest length.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// A team, with the sort order of its category resolved by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub affiliation: Option<String>,
    /// Category sort order; teams are publicly visible iff this matches the
    /// configured value.
    pub sortorder: i64,
}

/// A contest problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub id: String,
    /// Short code shown as the column label; display indices are assigned by
    /// sorting on this.
    pub short_name: String,
    pub title: String,
    pub color: Option<String>,
}

/// A raw submission, before judgements are merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: String,
    pub team_id: String,
    pub problem_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// One judging record for a submission. A submission can have several
/// (rejudging), of which at most one should be valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub submission_id: String,
    /// Invalid judgements are superseded rejudgings; they are ignored.
    pub valid: bool,
    /// Backend outcome code; `None` while judging is still in progress.
    pub outcome: Option<String>,
}

/// Behaviour flags read from the backend's own configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendFlags {
    /// When false, compile-error submissions are dropped from the public
    /// scoreboard entirely.
    pub compile_penalty: bool,
    /// When true, submissions made during the freeze stay visible as blank
    /// pending rows instead of disappearing.
    pub show_pending: bool,
}

/// Name and version of the judging backend, reported in the contest document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub name: String,
    pub version: String,
}
