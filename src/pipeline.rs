//! Cycle orchestration: fetch, merge, filter, assemble, publish.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::api::ScoreboardSource;
use crate::config::Config;
use crate::error::FeedResult;
use crate::filter::apply_visibility;
use crate::freeze::FreezeState;
use crate::merge::merge_submissions;
use crate::models::Team;
use crate::snapshot::assemble;
use crate::writer::SnapshotWriter;

/// Runs one snapshot cycle at a time.
///
/// A cycle either completes fully (both documents published) or aborts
/// before publishing; there is no carried-over state between cycles beyond
/// the configuration.
pub struct PipelineRunner {
    source: Arc<dyn ScoreboardSource>,
    writer: SnapshotWriter,
    config: Config,
}

impl PipelineRunner {
    pub fn new(source: Arc<dyn ScoreboardSource>, writer: SnapshotWriter, config: Config) -> Self {
        Self {
            source,
            writer,
            config,
        }
    }

    /// Run a single fetch-merge-filter-assemble-publish cycle.
    ///
    /// The backend fetches are independent and run concurrently; all of
    /// them must land before merging starts. Any failure aborts the cycle
    /// with nothing written.
    pub async fn run_cycle(&self) -> FeedResult<()> {
        tracing::debug!("Fetching backend state");
        let (flags, system, contest, teams, problems, submissions, judgements) = tokio::try_join!(
            self.source.fetch_flags(),
            self.source.fetch_system_info(),
            self.source.fetch_contest(),
            self.source.fetch_teams(),
            self.source.fetch_problems(),
            self.source.fetch_submissions(),
            self.source.fetch_judgements(),
        )?;

        let now = Utc::now();
        let force_unfreeze = self.config.filter.force_unfreeze
            || contest.unfreeze_at.is_some_and(|at| now >= at);
        let freeze = FreezeState::compute(&contest, now, force_unfreeze);
        tracing::debug!(
            "Contest '{}': elapsed {}s, frozen: {}",
            contest.title,
            freeze.elapsed_seconds,
            freeze.frozen_now
        );

        let merged = merge_submissions(&submissions, &judgements, &contest, flags.compile_penalty)?;

        let visible_teams: Vec<Team> = teams
            .into_iter()
            .filter(|team| team.sortorder == self.config.filter.sortorder)
            .collect();
        let visible_ids: HashSet<String> =
            visible_teams.iter().map(|team| team.id.clone()).collect();

        let filtered = apply_visibility(
            merged,
            &visible_ids,
            &contest,
            &freeze,
            flags.show_pending,
            force_unfreeze,
        );

        let snapshot = assemble(&contest, &system, &visible_teams, &problems, &filtered, &freeze);
        self.writer.publish(&snapshot).await?;

        tracing::info!(
            "Published snapshot: {} runs, contest time {}s{}",
            snapshot.runs.runs.len(),
            freeze.elapsed_seconds,
            if freeze.frozen_now { " (frozen)" } else { "" }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiGeneration, MockScoreboardSource};
    use crate::config::{ApiConfig, FilterConfig, OutputConfig, ScheduleConfig};
    use crate::constants::{CONTEST_FILE, RUNS_FILE};
    use crate::error::FeedError;
    use crate::models::{BackendFlags, Contest, Judgement, Problem, Submission, SystemInfo};
    use crate::snapshot::RunsDocument;
    use chrono::Duration;
    use std::path::Path;

    fn config(dest: &Path) -> Config {
        Config {
            api: ApiConfig {
                base_url: "http://localhost/api".to_string(),
                username: None,
                password: None,
                generation: ApiGeneration::Contest,
                timeout_ms: 3000,
                system_version: String::new(),
            },
            filter: FilterConfig {
                contest_id: "c1".to_string(),
                sortorder: 0,
                force_unfreeze: false,
            },
            output: OutputConfig {
                dest: dest.to_path_buf(),
            },
            schedule: ScheduleConfig { interval_ms: None },
        }
    }

    /// Contest that started 160 minutes ago: 180 min long, 30 min freeze,
    /// so the scoreboard is frozen while the test runs.
    fn running_contest() -> Contest {
        let start = Utc::now() - Duration::minutes(160);
        Contest {
            id: "c1".to_string(),
            title: "Test Contest".to_string(),
            start,
            end: start + Duration::minutes(180),
            freeze_duration: Some(Duration::minutes(30)),
            unfreeze_at: None,
        }
    }

    fn team(id: &str, sortorder: i64) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            affiliation: None,
            sortorder,
        }
    }

    fn submission(id: &str, team: &str, minutes: i64) -> Submission {
        Submission {
            id: id.to_string(),
            team_id: team.to_string(),
            problem_id: "p1".to_string(),
            submitted_at: running_contest().start + Duration::minutes(minutes),
        }
    }

    /// Wire up the fetches that stay the same across the tests below.
    fn expect_defaults(source: &mut MockScoreboardSource) {
        source.expect_fetch_flags().returning(|| {
            Ok(BackendFlags {
                compile_penalty: true,
                show_pending: true,
            })
        });
        source.expect_fetch_system_info().returning(|| {
            Ok(SystemInfo {
                name: "DOMjudge".to_string(),
                version: "8.2.0".to_string(),
            })
        });
        source
            .expect_fetch_teams()
            .returning(|| Ok(vec![team("t1", 0), team("jury", 9)]));
        source.expect_fetch_problems().returning(|| {
            Ok(vec![Problem {
                id: "p1".to_string(),
                short_name: "A".to_string(),
                title: "Apples".to_string(),
                color: None,
            }])
        });
    }

    fn judged_correct(submission_id: &str) -> Judgement {
        Judgement {
            submission_id: submission_id.to_string(),
            valid: true,
            outcome: Some("correct".to_string()),
        }
    }

    fn runner(source: MockScoreboardSource, dir: &Path) -> PipelineRunner {
        PipelineRunner::new(Arc::new(source), SnapshotWriter::new(dir), config(dir))
    }

    #[tokio::test]
    async fn test_successful_cycle_publishes_both_documents() {
        let mut source = MockScoreboardSource::new();
        expect_defaults(&mut source);
        source.expect_fetch_contest().returning(|| Ok(running_contest()));
        source
            .expect_fetch_submissions()
            .returning(|| Ok(vec![submission("1", "t1", 60), submission("2", "t1", 155)]));
        source
            .expect_fetch_judgements()
            .returning(|| Ok(vec![judged_correct("1"), judged_correct("2")]));

        let dir = tempfile::tempdir().unwrap();
        runner(source, dir.path()).run_cycle().await.unwrap();

        assert!(dir.path().join(CONTEST_FILE).exists());
        let runs_bytes = std::fs::read(dir.path().join(RUNS_FILE)).unwrap();
        let runs: RunsDocument = serde_json::from_slice(&runs_bytes).unwrap();

        assert!(runs.time.no_more_update);
        assert_eq!(runs.runs.len(), 2);
        // The early submission keeps its verdict, the one inside the freeze
        // window is redacted (show_pending is on, so the row stays).
        assert_eq!(runs.runs[0].result, "Yes");
        assert_eq!(runs.runs[1].result, "");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_cycle_without_publishing() {
        let mut source = MockScoreboardSource::new();
        expect_defaults(&mut source);
        source
            .expect_fetch_contest()
            .returning(|| Err(FeedError::ContestNotFound("c1".to_string())));
        source.expect_fetch_submissions().returning(|| Ok(vec![]));
        source.expect_fetch_judgements().returning(|| Ok(vec![]));

        let dir = tempfile::tempdir().unwrap();
        let err = runner(source, dir.path()).run_cycle().await.unwrap_err();

        assert!(matches!(err, FeedError::ContestNotFound(_)));
        assert!(!dir.path().join(CONTEST_FILE).exists());
        assert!(!dir.path().join(RUNS_FILE).exists());
    }

    #[tokio::test]
    async fn test_unknown_verdict_aborts_cycle_without_publishing() {
        let mut source = MockScoreboardSource::new();
        expect_defaults(&mut source);
        source.expect_fetch_contest().returning(|| Ok(running_contest()));
        source
            .expect_fetch_submissions()
            .returning(|| Ok(vec![submission("1", "t1", 60)]));
        source.expect_fetch_judgements().returning(|| {
            Ok(vec![Judgement {
                submission_id: "1".to_string(),
                valid: true,
                outcome: Some("quantum-flux".to_string()),
            }])
        });

        let dir = tempfile::tempdir().unwrap();
        let err = runner(source, dir.path()).run_cycle().await.unwrap_err();

        assert!(matches!(err, FeedError::UnknownVerdict(code) if code == "quantum-flux"));
        assert!(!dir.path().join(RUNS_FILE).exists());
    }

    #[tokio::test]
    async fn test_invisible_teams_never_reach_output() {
        let mut source = MockScoreboardSource::new();
        expect_defaults(&mut source);
        source.expect_fetch_contest().returning(|| Ok(running_contest()));
        source
            .expect_fetch_submissions()
            .returning(|| Ok(vec![submission("1", "t1", 60), submission("9", "jury", 61)]));
        source
            .expect_fetch_judgements()
            .returning(|| Ok(vec![judged_correct("1"), judged_correct("9")]));

        let dir = tempfile::tempdir().unwrap();
        runner(source, dir.path()).run_cycle().await.unwrap();

        let runs_bytes = std::fs::read(dir.path().join(RUNS_FILE)).unwrap();
        let runs: RunsDocument = serde_json::from_slice(&runs_bytes).unwrap();
        assert_eq!(runs.runs.len(), 1);
        assert_eq!(runs.runs[0].team, "t1");
    }
}
