//! Merging one sampling pass into the persisted snapshot.
//!
//! The live stats transport is an external collaborator; what it hands us
//! is one pass worth of execution records as a JSON document shaped like an
//! [`ApplicationStat`]. Ingestion decodes the pass, merges it into the
//! snapshot hierarchy keyed by name at every level, and writes the snapshot
//! back.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::snapshot::{self, Snapshot};
use crate::stats::ApplicationStat;

/// What one ingest pass left behind, for the CLI confirmation line.
#[derive(Debug)]
pub struct IngestOutcome {
    pub app_name: String,
    pub archives: usize,
    pub processes: usize,
    pub activities: usize,
}

/// Decode one sampling pass from a JSON dump.
pub fn read_samples(path: &Path) -> Result<ApplicationStat> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Merge the sampling pass at `samples_path` into the snapshot at
/// `snapshot_path`, creating the snapshot on the first pass. Returns the
/// cumulative entity counts after the merge.
pub fn ingest(snapshot_path: &Path, samples_path: &Path) -> Result<IngestOutcome> {
    let pass = read_samples(samples_path)?;

    let mut snap = snapshot::read(snapshot_path)?
        .unwrap_or_else(|| Snapshot::new(pass.app_name.clone()));
    snap.app.merge(&pass);
    snap.touch();
    snapshot::write(snapshot_path, &snap)?;

    Ok(IngestOutcome {
        app_name: snap.app.app_name.clone(),
        archives: snap.app.archive_count(),
        processes: snap.app.process_count(),
        activities: snap.app.activity_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "app_name": "orders",
        "archives": {
            "engine-1": {
                "archive_name": "engine-1",
                "processes": {
                    "P1": {
                        "process_name": "P1",
                        "starter_name": "HTTP Receiver",
                        "execution_count": 3,
                        "execution_since_reset": 2,
                        "activities": {
                            "A1": {
                                "process_name": "P1",
                                "activity_name": "A1",
                                "execution_count": 3,
                                "execution_since_reset": 2
                            }
                        }
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_ingest_creates_and_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("stats.bin");
        let samples_path = dir.path().join("pass.json");
        fs::write(&samples_path, SAMPLE).unwrap();

        let outcome = ingest(&snapshot_path, &samples_path).unwrap();
        assert_eq!(outcome.app_name, "orders");
        assert_eq!(outcome.archives, 1);
        assert_eq!(outcome.processes, 1);
        assert_eq!(outcome.activities, 1);

        // Second pass doubles the counts rather than replacing them.
        ingest(&snapshot_path, &samples_path).unwrap();
        let snap = snapshot::read(&snapshot_path).unwrap().unwrap();
        let process = &snap.app.archives["engine-1"].processes["P1"];
        assert_eq!(process.execution_count, 6);
        assert_eq!(process.execution_since_reset, 4);
    }

    #[test]
    fn test_bad_samples_fail_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let samples_path = dir.path().join("pass.json");
        fs::write(&samples_path, "not json").unwrap();

        let err = ingest(&dir.path().join("stats.bin"), &samples_path).unwrap_err();
        assert!(matches!(err, crate::error::FlowcovError::Json(_)));
    }
}
