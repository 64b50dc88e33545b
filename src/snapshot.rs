//! Output documents and the snapshot assembler.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::freeze::FreezeState;
use crate::merge::JudgedSubmission;
use crate::models::{Contest, Problem, SystemInfo, Team};

/// Contest descriptor document (`contest.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestDocument {
    pub title: String,
    #[serde(rename = "systemName")]
    pub system_name: String,
    #[serde(rename = "systemVersion")]
    pub system_version: String,
    pub problems: Vec<ProblemEntry>,
    pub teams: Vec<TeamEntry>,
}

/// Problem entry in the contest document. `id` is the display index, not the
/// backend problem id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemEntry {
    pub id: usize,
    pub title: String,
    pub name: String,
    pub color: String,
}

/// Team entry in the contest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id: String,
    pub name: String,
    pub group: String,
}

/// Run list document (`runs.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunsDocument {
    pub time: TimeBlock,
    pub runs: Vec<RunEntry>,
}

/// Contest clock block of the runs document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    #[serde(rename = "contestTime")]
    pub contest_time: i64,
    #[serde(rename = "noMoreUpdate")]
    pub no_more_update: bool,
    /// Reserved field, fixed at 0 for downstream compatibility.
    pub timestamp: i64,
}

/// One run in the runs document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub id: String,
    /// Display index of the problem, assigned by short-code order.
    pub problem: usize,
    pub team: String,
    pub result: String,
    #[serde(rename = "submissionTime")]
    pub submission_time: i64,
}

/// The pair of documents produced by one pipeline cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub contest: ContestDocument,
    pub runs: RunsDocument,
}

/// Assign display indices by sorting problems on their short code.
///
/// The sort is stable, so problems sharing a short code keep their backend
/// order. Indices are dense and zero-based and must be recomputed every
/// cycle since problems can be added mid-contest.
fn display_order(problems: &[Problem]) -> (Vec<&Problem>, HashMap<&str, usize>) {
    let mut ordered: Vec<&Problem> = problems.iter().collect();
    ordered.sort_by(|a, b| a.short_name.cmp(&b.short_name));

    let index: HashMap<&str, usize> = ordered
        .iter()
        .enumerate()
        .map(|(idx, problem)| (problem.id.as_str(), idx))
        .collect();

    (ordered, index)
}

/// Build both output documents from filtered, classified data.
///
/// `teams` must already be restricted to the visible set; the runs are
/// emitted in the order the submissions come in. A run referencing a problem
/// the backend did not list is skipped rather than published with a dangling
/// index.
pub fn assemble(
    contest: &Contest,
    system: &SystemInfo,
    teams: &[Team],
    problems: &[Problem],
    submissions: &[JudgedSubmission],
    freeze: &FreezeState,
) -> Snapshot {
    let (ordered, index) = display_order(problems);

    let problem_entries = ordered
        .iter()
        .enumerate()
        .map(|(idx, problem)| ProblemEntry {
            id: idx,
            title: problem.title.clone(),
            name: problem.short_name.clone(),
            color: problem.color.clone().unwrap_or_default(),
        })
        .collect();

    let team_entries = teams
        .iter()
        .map(|team| TeamEntry {
            id: team.id.clone(),
            name: team.name.clone(),
            group: team.affiliation.clone().unwrap_or_default(),
        })
        .collect();

    let mut runs = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let Some(&problem_idx) = index.get(submission.problem_id.as_str()) else {
            tracing::warn!(
                "Skipping run {}: problem {} is not part of the contest",
                submission.id,
                submission.problem_id
            );
            continue;
        };
        runs.push(RunEntry {
            id: submission.id.clone(),
            problem: problem_idx,
            team: submission.team_id.clone(),
            result: submission.verdict.result_str().to_string(),
            submission_time: submission.minutes,
        });
    }

    Snapshot {
        contest: ContestDocument {
            title: contest.title.clone(),
            system_name: system.name.clone(),
            system_version: system.version.clone(),
            problems: problem_entries,
            teams: team_entries,
        },
        runs: RunsDocument {
            time: TimeBlock {
                contest_time: freeze.elapsed_seconds,
                no_more_update: freeze.frozen_now,
                timestamp: 0,
            },
            runs,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::PublicVerdict;
    use chrono::{Duration, TimeZone, Utc};

    fn contest() -> Contest {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        Contest {
            id: "1".to_string(),
            title: "Regional Finals".to_string(),
            start,
            end: start + Duration::minutes(180),
            freeze_duration: Some(Duration::minutes(30)),
            unfreeze_at: None,
        }
    }

    fn system() -> SystemInfo {
        SystemInfo {
            name: "DOMjudge".to_string(),
            version: "8.2.0".to_string(),
        }
    }

    fn problem(id: &str, short_name: &str) -> Problem {
        Problem {
            id: id.to_string(),
            short_name: short_name.to_string(),
            title: format!("Problem {short_name}"),
            color: None,
        }
    }

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            affiliation: Some("Test University".to_string()),
            sortorder: 0,
        }
    }

    fn judged(id: &str, problem_id: &str, minutes: i64, verdict: PublicVerdict) -> JudgedSubmission {
        JudgedSubmission {
            id: id.to_string(),
            team_id: "t1".to_string(),
            problem_id: problem_id.to_string(),
            submitted_at: contest().start + Duration::minutes(minutes),
            minutes,
            verdict,
        }
    }

    fn state() -> FreezeState {
        FreezeState {
            frozen_now: false,
            freeze_start_minutes: Some(150),
            elapsed_seconds: 3600,
        }
    }

    #[test]
    fn test_display_indices_follow_short_code_order() {
        // Problems arrive out of order: id 5 is "B", id 2 is "A".
        let problems = vec![problem("5", "B"), problem("2", "A")];
        let subs = vec![
            judged("1", "2", 10, PublicVerdict::Yes),
            judged("2", "5", 20, PublicVerdict::Yes),
        ];

        let snapshot = assemble(&contest(), &system(), &[team("t1")], &problems, &subs, &state());

        assert_eq!(snapshot.contest.problems[0].name, "A");
        assert_eq!(snapshot.contest.problems[0].id, 0);
        assert_eq!(snapshot.contest.problems[1].name, "B");
        assert_eq!(snapshot.contest.problems[1].id, 1);
        assert_eq!(snapshot.runs.runs[0].problem, 0);
        assert_eq!(snapshot.runs.runs[1].problem, 1);
    }

    #[test]
    fn test_time_block() {
        let problems = vec![problem("1", "A")];
        let frozen = FreezeState {
            frozen_now: true,
            freeze_start_minutes: Some(150),
            elapsed_seconds: 160 * 60,
        };
        let snapshot = assemble(&contest(), &system(), &[], &problems, &[], &frozen);

        assert_eq!(snapshot.runs.time.contest_time, 160 * 60);
        assert!(snapshot.runs.time.no_more_update);
        assert_eq!(snapshot.runs.time.timestamp, 0);
    }

    #[test]
    fn test_run_for_unlisted_problem_skipped() {
        let problems = vec![problem("1", "A")];
        let subs = vec![
            judged("1", "1", 10, PublicVerdict::Yes),
            judged("2", "99", 20, PublicVerdict::Yes),
        ];
        let snapshot = assemble(&contest(), &system(), &[team("t1")], &problems, &subs, &state());
        assert_eq!(snapshot.runs.runs.len(), 1);
        assert_eq!(snapshot.runs.runs[0].id, "1");
    }

    #[test]
    fn test_wire_field_names() {
        let problems = vec![problem("1", "A")];
        let subs = vec![judged("1", "1", 42, PublicVerdict::WrongAnswer)];
        let snapshot = assemble(&contest(), &system(), &[team("t1")], &problems, &subs, &state());

        let contest_json = serde_json::to_value(&snapshot.contest).unwrap();
        assert_eq!(contest_json["systemName"], "DOMjudge");
        assert_eq!(contest_json["systemVersion"], "8.2.0");
        assert_eq!(contest_json["teams"][0]["group"], "Test University");
        assert_eq!(contest_json["problems"][0]["name"], "A");

        let runs_json = serde_json::to_value(&snapshot.runs).unwrap();
        assert_eq!(runs_json["time"]["contestTime"], 3600);
        assert_eq!(runs_json["time"]["noMoreUpdate"], false);
        assert_eq!(runs_json["time"]["timestamp"], 0);
        assert_eq!(runs_json["runs"][0]["result"], "No - Wrong Answer");
        assert_eq!(runs_json["runs"][0]["submissionTime"], 42);
    }

    #[test]
    fn test_missing_color_and_affiliation_serialize_empty() {
        let problems = vec![problem("1", "A")];
        let mut bare_team = team("t1");
        bare_team.affiliation = None;
        let snapshot = assemble(&contest(), &system(), &[bare_team], &problems, &[], &state());

        assert_eq!(snapshot.contest.problems[0].color, "");
        assert_eq!(snapshot.contest.teams[0].group, "");
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let problems = vec![problem("5", "B"), problem("2", "A"), problem("9", "C")];
        let subs = vec![
            judged("1", "2", 10, PublicVerdict::Yes),
            judged("2", "9", 20, PublicVerdict::Pending),
        ];

        let first = assemble(&contest(), &system(), &[team("t1")], &problems, &subs, &state());
        let second = assemble(&contest(), &system(), &[team("t1")], &problems, &subs, &state());

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first.contest).unwrap(),
            serde_json::to_vec(&second.contest).unwrap()
        );
        assert_eq!(
            serde_json::to_vec(&first.runs).unwrap(),
            serde_json::to_vec(&second.runs).unwrap()
        );
    }
}
