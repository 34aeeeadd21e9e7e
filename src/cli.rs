//! Command handler functions for the flowcov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use crate::error::FlowcovError;
use crate::filter::FilterSpec;
use crate::ingest;
use crate::model::Node;
use crate::snapshot::{self, Snapshot};
use crate::writers::{self, Format};

pub fn cmd_ingest(snapshot_path: &Path, samples: &Path) -> Result<String> {
    let outcome = ingest::ingest(snapshot_path, samples)?;
    Ok(format!(
        "Merged {} into '{}' → {} archives, {} processes, {} activities\n",
        samples.display(),
        outcome.app_name,
        outcome.archives,
        outcome.processes,
        outcome.activities,
    ))
}

pub fn cmd_merge(snapshot_path: &Path, other: &Path) -> Result<String> {
    let source = snapshot::read(other)?
        .ok_or_else(|| FlowcovError::SnapshotNotFound(other.display().to_string()))?;

    let mut target = snapshot::read(snapshot_path)?
        .unwrap_or_else(|| Snapshot::new(source.app.app_name.clone()));
    target.app.merge(&source.app);
    target.touch();
    snapshot::write(snapshot_path, &target)?;

    Ok(format!(
        "Merged {} into {} → {} processes, {} activities\n",
        other.display(),
        snapshot_path.display(),
        target.app.process_count(),
        target.app.activity_count(),
    ))
}

pub fn cmd_summary(snapshot_path: &Path, filter: &FilterSpec) -> Result<String> {
    let (snap, bundle) = load_bundle(snapshot_path)?;
    match writers::render(&bundle, Format::Text, filter)? {
        Some(body) => {
            let mut out = String::new();
            writeln!(out, "Snapshot:    {}", snapshot_path.display()).unwrap();
            writeln!(out, "Updated:     {}", snap.updated_at).unwrap();
            out.push('\n');
            out.push_str(&body);
            Ok(out)
        }
        None => Ok(nothing_to_report()),
    }
}

pub fn cmd_report(
    snapshot_path: &Path,
    format: Format,
    output: Option<&Path>,
    filter: &FilterSpec,
) -> Result<String> {
    let (_, bundle) = load_bundle(snapshot_path)?;
    let Some(body) = writers::render(&bundle, format, filter)? else {
        return Ok(nothing_to_report());
    };
    match output {
        Some(path) => {
            std::fs::write(path, &body)?;
            Ok(format!("Wrote {} report to {}\n", format, path.display()))
        }
        None => Ok(body),
    }
}

pub fn cmd_reset(snapshot_path: &Path) -> Result<String> {
    if snapshot_path.exists() {
        std::fs::remove_file(snapshot_path)?;
        Ok(format!("Deleted {}\n", snapshot_path.display()))
    } else {
        Ok(format!("No snapshot at {}\n", snapshot_path.display()))
    }
}

fn load_bundle(snapshot_path: &Path) -> Result<(Snapshot, Node)> {
    let snap = snapshot::read(snapshot_path)?
        .ok_or_else(|| FlowcovError::SnapshotNotFound(snapshot_path.display().to_string()))?;
    let bundle = snap.app.to_coverage_node()?;
    Ok((snap, bundle))
}

fn nothing_to_report() -> String {
    "Nothing to report (filter matched no activities).\n".to_string()
}
