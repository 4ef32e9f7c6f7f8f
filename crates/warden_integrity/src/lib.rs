// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod baseline;
pub mod verify;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;

pub use baseline::IntegrityBaseline;
pub use verify::VerifyResult;

/// Failure modes that abort a baseline operation outright. A missing
/// baseline is deliberately *not* one of these; see
/// [`verify_integrity`].
#[derive(thiserror::Error, Debug, Serialize, Diagnostic, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrityError {
    /// The source tree or reports directory could not be read or written.
    #[error("integrity I/O error at '{path}': {error}")]
    Io { path: String, error: String },
    /// A persisted baseline file exists but could not be parsed.
    #[error("baseline '{label}' at '{path}' is not valid JSON: {error}")]
    Corrupt { label: String, path: String, error: String },
}

fn baseline_path(reports_dir: &Path, label: &str) -> PathBuf {
    reports_dir.join("integrity").join(format!("{label}.json"))
}

/// Snapshots `src_root` and persists it under `reports_dir/integrity/<label>.json`.
pub fn create_baseline(src_root: &Path, reports_dir: &Path, label: &str) -> Result<PathBuf, IntegrityError> {
    let digests = baseline::snapshot_tree(src_root).map_err(|e| IntegrityError::Io {
        path: src_root.display().to_string(),
        error: e.to_string(),
    })?;

    let snapshot = IntegrityBaseline {
        label: label.to_owned(),
        created_at: chrono::Utc::now().to_rfc3339(),
        per_file_sha256: digests,
    };

    let path = baseline_path(reports_dir, label);
    let contents = serde_json::to_vec_pretty(&snapshot).expect("IntegrityBaseline always serializes");
    warden_common::atomic_write::write_atomic(&path, &contents).map_err(|e| IntegrityError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    Ok(path)
}

/// Loads a previously persisted baseline, if one exists for `label`.
pub fn load_baseline(reports_dir: &Path, label: &str) -> Result<Option<IntegrityBaseline>, IntegrityError> {
    let path = baseline_path(reports_dir, label);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| IntegrityError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let baseline = serde_json::from_str(&contents).map_err(|e| IntegrityError::Corrupt {
        label: label.to_owned(),
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    Ok(Some(baseline))
}

/// Compares `src_root`'s current contents against the stored baseline for
/// `label`. A missing baseline yields `ok=false` with a descriptive error,
/// never a crash.
pub fn verify_integrity(src_root: &Path, reports_dir: &Path, label: &str) -> Result<VerifyResult, IntegrityError> {
    match load_baseline(reports_dir, label)? {
        Some(baseline) => {
            let result = verify::verify_against(src_root, &baseline).map_err(|e| IntegrityError::Io {
                path: src_root.display().to_string(),
                error: e.to_string(),
            })?;
            Ok(result)
        }
        None => Ok(verify::missing_baseline_result(label)),
    }
}
