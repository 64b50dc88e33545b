//! Contest-relative duration parsing.
//!
//! The contest-scoped API encodes durations and relative times as
//! `[-]H:MM:SS` with an optional fractional-second part, e.g. `5:00:00`,
//! `1:23:45.678` or `-0:03:00` for pre-contest practice submissions.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

static RELTIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?(\d+):([0-5]\d):([0-5]\d)(?:\.(\d{1,3}))?$").expect("valid reltime pattern")
});

/// Parse a relative duration string. Returns `None` for anything outside
/// the grammar.
pub fn parse_reltime(s: &str) -> Option<Duration> {
    let caps = RELTIME.captures(s)?;

    let hours: i64 = caps[2].parse().ok()?;
    let minutes: i64 = caps[3].parse().ok()?;
    let seconds: i64 = caps[4].parse().ok()?;
    let millis: i64 = match caps.get(5) {
        Some(frac) => {
            let digits = frac.as_str();
            let value: i64 = digits.parse().ok()?;
            value * 10_i64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };

    let total = Duration::milliseconds(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis);
    Some(if caps.get(1).is_some() { -total } else { total })
}
