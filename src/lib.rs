//! Scorefeed - public scoreboard snapshot converter
//!
//! Polls a DOMjudge-style judging backend and derives the two public
//! scoreboard documents (`contest.json`, `runs.json`), honoring the
//! scoreboard freeze policy near contest end.
//!
//! # Architecture
//!
//! One cycle flows through a fixed pipeline:
//! - **Fetch adapters**: one per backend API generation, producing
//!   normalized records
//! - **Merge**: join submissions with their judgements and classify verdicts
//! - **Window**: compute elapsed contest time and the freeze state
//! - **Filter**: team visibility, contest-end cutoff, freeze redaction
//! - **Assemble + publish**: build and atomically write both documents

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod freeze;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod snapshot;
pub mod verdict;
pub mod writer;

// Re-export commonly used types
pub use config::Config;
pub use error::{FeedError, FeedResult};
pub use pipeline::PipelineRunner;
