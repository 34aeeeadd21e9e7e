//! Persistence of the merged stats hierarchy between sampling passes.
//!
//! The snapshot is a flat binary blob (bincode over the same serde derives
//! the sample decoder uses): the full structure is written and read back
//! verbatim. It is the only on-disk artifact this crate owns; report output
//! is regenerated fresh from the tree on every run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stats::ApplicationStat;

/// Merged application stats plus bookkeeping metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub app: ApplicationStat,
    /// RFC 3339 timestamp of the last merge into this snapshot.
    pub updated_at: String,
}

impl Snapshot {
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app: ApplicationStat::new(app_name),
            updated_at: now(),
        }
    }

    /// Refresh the merge timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Write the snapshot, replacing any previous file.
pub fn write(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes = bincode::serialize(snapshot)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a snapshot, or `Ok(None)` when the file does not exist yet (nothing
/// has been ingested).
pub fn read(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    Ok(Some(bincode::deserialize(&bytes)?))
}

/// Read the snapshot at `path`, or start a fresh one for `app_name`.
pub fn load_or_new(path: &Path, app_name: &str) -> Result<Snapshot> {
    Ok(read(path)?.unwrap_or_else(|| Snapshot::new(app_name)))
}
