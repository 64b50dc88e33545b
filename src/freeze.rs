//! Contest time-window arithmetic.

use chrono::{DateTime, Duration, Utc};

use crate::models::Contest;

/// Derived freeze-window state for one cycle.
///
/// Never stored; recomputed fresh from the contest record and a wall-clock
/// sample each time a snapshot is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeState {
    /// Whether the scoreboard is frozen right now.
    pub frozen_now: bool,
    /// Contest-relative minute at which the freeze window opens.
    /// `None` when the contest has no freeze configured.
    pub freeze_start_minutes: Option<i64>,
    /// Elapsed contest time in whole seconds, clamped to `[0, duration]`.
    pub elapsed_seconds: i64,
}

impl FreezeState {
    /// Compute the window state at `now`.
    ///
    /// `force_unfreeze` is the caller's combined override (static config or
    /// the contest's own unfreeze instant having passed); the calculator
    /// does not derive it itself since the override source differs per
    /// backend generation.
    pub fn compute(contest: &Contest, now: DateTime<Utc>, force_unfreeze: bool) -> Self {
        let duration = contest.duration();
        let elapsed = (now.min(contest.end) - contest.start).clamp(Duration::zero(), duration);
        let elapsed_seconds = elapsed.num_seconds();

        let Some(freeze_duration) = contest.freeze_duration else {
            return FreezeState {
                frozen_now: false,
                freeze_start_minutes: None,
                elapsed_seconds,
            };
        };

        let freeze_start_minutes = duration.num_minutes() - freeze_duration.num_minutes();
        let frozen_now = elapsed.num_minutes() >= freeze_start_minutes && !force_unfreeze;

        FreezeState {
            frozen_now,
            freeze_start_minutes: Some(freeze_start_minutes),
            elapsed_seconds,
        }
    }
}
