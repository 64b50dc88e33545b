//! Application-wide constants and defaults.

/// System name reported in the contest document.
pub const SYSTEM_NAME: &str = "DOMjudge";

/// Output file name for the contest descriptor.
pub const CONTEST_FILE: &str = "contest.json";

/// Output file name for the run list.
pub const RUNS_FILE: &str = "runs.json";

/// Default per-fetch timeout in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3000;

/// Default team category sort order considered publicly visible.
pub const DEFAULT_SORTORDER: i64 = 0;

/// Default output directory for the snapshot documents.
pub const DEFAULT_OUTPUT_DIR: &str = ".";
