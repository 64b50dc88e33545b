//! Snapshot document writer.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::constants::{CONTEST_FILE, RUNS_FILE};
use crate::error::{FeedError, FeedResult};
use crate::snapshot::Snapshot;

/// Writes the two snapshot documents into the output directory.
///
/// Both documents are serialized before anything touches the filesystem,
/// and each file lands via a temp-file rename, so consumers never observe a
/// half-written snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dest: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    /// Publish both documents, failing if either write fails.
    pub async fn publish(&self, snapshot: &Snapshot) -> FeedResult<()> {
        let contest = serde_json::to_vec_pretty(&snapshot.contest)?;
        let runs = serde_json::to_vec_pretty(&snapshot.runs)?;

        tokio::try_join!(
            self.write_file(CONTEST_FILE, contest),
            self.write_file(RUNS_FILE, runs),
        )?;

        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: Vec<u8>) -> FeedResult<()> {
        let path = self.dest.join(name);
        let tmp = self.dest.join(format!(".{name}.tmp"));

        fs::write(&tmp, &bytes)
            .await
            .map_err(|source| write_error(&tmp, source))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|source| write_error(&path, source))?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

fn write_error(path: &Path, source: std::io::Error) -> FeedError {
    FeedError::Write {
        path: path.to_path_buf(),
        source,
    }
}
