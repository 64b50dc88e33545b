//! Joins raw submissions with their judgements into verdict-annotated
//! submissions, one output record per input submission.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::FeedResult;
use crate::models::{Contest, Judgement, Submission};
use crate::verdict::PublicVerdict;

/// A submission annotated with its public verdict and contest-relative time.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgedSubmission {
    pub id: String,
    pub team_id: String,
    pub problem_id: String,
    pub submitted_at: DateTime<Utc>,
    /// Whole minutes since contest start, floored. Never negative:
    /// pre-contest submissions are dropped before this is recorded.
    pub minutes: i64,
    pub verdict: PublicVerdict,
}

/// Merge judgements into submissions and classify the outcome of each.
///
/// Invalid judgements are ignored. When several valid judgements reference
/// the same submission, the last one in backend return order wins, so
/// callers must pass `judgements` in the order the backend produced them.
/// Pre-contest submissions are dropped as expected practice noise; an
/// unknown outcome code aborts the whole merge.
pub fn merge_submissions(
    submissions: &[Submission],
    judgements: &[Judgement],
    contest: &Contest,
    compile_penalty: bool,
) -> FeedResult<Vec<JudgedSubmission>> {
    let mut authoritative: HashMap<&str, &Judgement> = HashMap::new();
    for judgement in judgements.iter().filter(|j| j.valid) {
        authoritative.insert(judgement.submission_id.as_str(), judgement);
    }

    let mut merged = Vec::with_capacity(submissions.len());
    for submission in submissions {
        if submission.submitted_at < contest.start {
            tracing::debug!(
                "Dropping pre-contest submission {} at {}",
                submission.id,
                submission.submitted_at
            );
            continue;
        }

        let outcome = authoritative
            .get(submission.id.as_str())
            .and_then(|j| j.outcome.as_deref());
        let verdict = PublicVerdict::classify(outcome)?;

        if verdict == PublicVerdict::CompilationError && !compile_penalty {
            tracing::debug!(
                "Dropping compile-error submission {} (compile errors not penalized)",
                submission.id
            );
            continue;
        }

        merged.push(JudgedSubmission {
            id: submission.id.clone(),
            team_id: submission.team_id.clone(),
            problem_id: submission.problem_id.clone(),
            submitted_at: submission.submitted_at,
            minutes: (submission.submitted_at - contest.start).num_minutes(),
            verdict,
        });
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use chrono::{Duration, TimeZone};

    fn contest() -> Contest {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        Contest {
            id: "1".to_string(),
            title: "Test Contest".to_string(),
            start,
            end: start + Duration::minutes(180),
            freeze_duration: None,
            unfreeze_at: None,
        }
    }

    fn submission(id: &str, minutes: i64) -> Submission {
        Submission {
            id: id.to_string(),
            team_id: "t1".to_string(),
            problem_id: "p1".to_string(),
            submitted_at: contest().start + Duration::minutes(minutes),
        }
    }

    fn judgement(submission_id: &str, valid: bool, outcome: Option<&str>) -> Judgement {
        Judgement {
            submission_id: submission_id.to_string(),
            valid,
            outcome: outcome.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_judgement_wins_over_invalid() {
        // An invalid WA followed by a valid AC: the submission is accepted.
        let subs = vec![submission("42", 10)];
        let judgements = vec![
            judgement("42", false, Some("WA")),
            judgement("42", true, Some("AC")),
        ];

        let merged = merge_submissions(&subs, &judgements, &contest(), true).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].verdict, PublicVerdict::Yes);
    }

    #[test]
    fn test_last_valid_judgement_wins() {
        let subs = vec![submission("7", 25)];
        let judgements = vec![
            judgement("7", true, Some("wrong-answer")),
            judgement("7", true, Some("correct")),
        ];

        let merged = merge_submissions(&subs, &judgements, &contest(), true).unwrap();
        assert_eq!(merged[0].verdict, PublicVerdict::Yes);
    }

    #[test]
    fn test_unjudged_submission_is_pending() {
        let subs = vec![submission("5", 40)];
        let merged = merge_submissions(&subs, &[], &contest(), true).unwrap();
        assert_eq!(merged[0].verdict, PublicVerdict::Pending);
    }

    #[test]
    fn test_in_progress_judgement_is_pending() {
        let subs = vec![submission("5", 40)];
        let judgements = vec![judgement("5", true, None)];
        let merged = merge_submissions(&subs, &judgements, &contest(), true).unwrap();
        assert_eq!(merged[0].verdict, PublicVerdict::Pending);
    }

    #[test]
    fn test_pre_contest_submission_dropped() {
        let subs = vec![submission("3", -5), submission("4", 0)];
        let merged = merge_submissions(&subs, &[], &contest(), true).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "4");
        assert_eq!(merged[0].minutes, 0);
    }

    #[test]
    fn test_compile_error_dropped_without_penalty() {
        let subs = vec![submission("9", 15)];
        let judgements = vec![judgement("9", true, Some("compiler-error"))];

        let merged = merge_submissions(&subs, &judgements, &contest(), false).unwrap();
        assert!(merged.is_empty());

        let merged = merge_submissions(&subs, &judgements, &contest(), true).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].verdict, PublicVerdict::CompilationError);
    }

    #[test]
    fn test_unknown_outcome_aborts_merge() {
        let subs = vec![submission("1", 10)];
        let judgements = vec![judgement("1", true, Some("memory-limit"))];

        let err = merge_submissions(&subs, &judgements, &contest(), true).unwrap_err();
        assert!(matches!(err, FeedError::UnknownVerdict(code) if code == "memory-limit"));
    }

    #[test]
    fn test_one_output_per_submission() {
        let subs = vec![submission("1", 5), submission("2", 6), submission("3", 7)];
        let judgements = vec![
            judgement("2", true, Some("correct")),
            judgement("2", false, Some("wrong-answer")),
        ];

        let merged = merge_submissions(&subs, &judgements, &contest(), true).unwrap();
        assert_eq!(merged.len(), 3);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_minutes_are_floored() {
        let mut sub = submission("8", 0);
        sub.submitted_at = contest().start + Duration::seconds(119);
        let merged = merge_submissions(&[sub], &[], &contest(), true).unwrap();
        assert_eq!(merged[0].minutes, 1);
    }
}
