// SPDX-License-Identifier: Apache-2.0

//! Snapshotting a source tree into a `{relpath -> sha256}` baseline.

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const IGNORED_DIR_NAMES: &[&str] = &[".git", "target", "node_modules", "__pycache__", ".venv"];

/// A content-hash snapshot of a source tree at the time it was created.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IntegrityBaseline {
    /// Caller-chosen identifier for this snapshot.
    pub label: String,
    /// ISO-8601 UTC timestamp the snapshot was taken.
    pub created_at: String,
    /// Repository-relative path to SHA-256 hex digest, for every
    /// non-ignored file under the snapshotted root.
    pub per_file_sha256: BTreeMap<String, String>,
}

/// True if `name` (a single path component) marks a subtree the baseline
/// should never descend into, matching the auditor's own traversal filter.
#[must_use]
pub fn is_ignored_dir(name: &str) -> bool {
    IGNORED_DIR_NAMES.contains(&name) || name.starts_with('.')
}

/// Hashes every file under `root`, skipping ignored directories, and
/// returns `{relpath -> sha256}` with repository-relative, forward-slash
/// paths as keys.
pub fn snapshot_tree(root: &Path) -> std::io::Result<BTreeMap<String, String>> {
    let mut digests = BTreeMap::new();
    if !root.exists() {
        return Ok(digests);
    }

    let walker = walkdir::WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        match entry.file_name().to_str() {
            Some(name) => !is_ignored_dir(name),
            None => true,
        }
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let contents = std::fs::read(entry.path())?;
        let digest = Sha256::digest(&contents);
        let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
        digests.insert(relative.to_string_lossy().replace('\\', "/"), hex);
    }

    Ok(digests)
}
