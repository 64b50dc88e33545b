//! Visibility and freeze-window filtering of merged submissions.

use std::collections::HashSet;

use crate::freeze::FreezeState;
use crate::merge::JudgedSubmission;
use crate::models::Contest;
use crate::verdict::PublicVerdict;

/// Apply the public-visibility rules to merged submissions.
///
/// The steps run in a fixed order:
/// 1. submissions from teams outside `visible_teams` are dropped;
/// 2. submissions at or after contest end are dropped;
/// 3. while frozen, submissions inside the freeze window get their verdict
///    redacted to `Hidden`;
/// 4. while frozen and neither `show_pending` nor `force_unfreeze` is set,
///    those same submissions are dropped entirely instead of being shown as
///    blank rows.
///
/// The freeze rules key on submission time alone, so a still-pending
/// submission inside the window is treated exactly like a judged one.
pub fn apply_visibility(
    submissions: Vec<JudgedSubmission>,
    visible_teams: &HashSet<String>,
    contest: &Contest,
    freeze: &FreezeState,
    show_pending: bool,
    force_unfreeze: bool,
) -> Vec<JudgedSubmission> {
    let mut visible = Vec::with_capacity(submissions.len());

    for mut submission in submissions {
        if !visible_teams.contains(&submission.team_id) {
            continue;
        }
        if submission.submitted_at >= contest.end {
            continue;
        }

        if freeze.frozen_now {
            if let Some(freeze_start) = freeze.freeze_start_minutes {
                if submission.minutes >= freeze_start {
                    if !show_pending && !force_unfreeze {
                        continue;
                    }
                    submission.verdict = PublicVerdict::Hidden;
                }
            }
        }

        visible.push(submission);
    }

    visible
}
