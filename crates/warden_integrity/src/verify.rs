// SPDX-License-Identifier: Apache-2.0

//! Comparing a live tree against a previously stored `IntegrityBaseline`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::baseline::{snapshot_tree, IntegrityBaseline};

/// Outcome of comparing a live tree against a stored baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResult {
    /// True when the live tree matches the baseline exactly.
    pub ok: bool,
    /// Human-readable description of every divergence found, combining the
    /// modified/deleted/added partitions into one flat list.
    pub errors: Vec<String>,
    /// Files present in both snapshots with a changed digest.
    pub modified: Vec<String>,
    /// Files present in the baseline but missing from the live tree.
    pub deleted: Vec<String>,
    /// Files present in the live tree but absent from the baseline.
    pub added: Vec<String>,
}

/// Compares `root`'s current contents against `baseline`.
///
/// A missing baseline is the caller's concern (see
/// [`crate::load_baseline`]); this function only ever compares two
/// snapshots already in hand.
pub fn verify_against(root: &Path, baseline: &IntegrityBaseline) -> std::io::Result<VerifyResult> {
    let live = snapshot_tree(root)?;

    let mut modified = Vec::new();
    let mut deleted = Vec::new();
    let mut added = Vec::new();

    for (path, expected_hash) in &baseline.per_file_sha256 {
        match live.get(path) {
            Some(actual_hash) if actual_hash == expected_hash => {}
            Some(_) => modified.push(path.clone()),
            None => deleted.push(path.clone()),
        }
    }
    for path in live.keys() {
        if !baseline.per_file_sha256.contains_key(path) {
            added.push(path.clone());
        }
    }

    modified.sort();
    deleted.sort();
    added.sort();

    let mut errors = Vec::new();
    errors.extend(modified.iter().map(|p| format!("modified: {p}")));
    errors.extend(deleted.iter().map(|p| format!("deleted: {p}")));
    errors.extend(added.iter().map(|p| format!("added: {p}")));

    Ok(VerifyResult {
        ok: errors.is_empty(),
        errors,
        modified,
        deleted,
        added,
    })
}

/// The `ok=false` outcome returned when no baseline exists for a label,
/// per the invariant that a missing baseline is not a crash.
#[must_use]
pub fn missing_baseline_result(label: &str) -> VerifyResult {
    VerifyResult {
        ok: false,
        errors: vec![format!("no baseline recorded for label '{label}'")],
        modified: Vec::new(),
        deleted: Vec::new(),
        added: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn baseline_of(entries: &[(&str, &str)]) -> IntegrityBaseline {
        IntegrityBaseline {
            label: "test".to_owned(),
            created_at: "2026-01-01T00:00:00Z".to_owned(),
            per_file_sha256: entries.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn unchanged_tree_round_trips_clean() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), b"x").expect("write");
        let snapshot = snapshot_tree(dir.path()).expect("snapshot");
        let baseline = IntegrityBaseline {
            label: "l".to_owned(),
            created_at: "2026-01-01T00:00:00Z".to_owned(),
            per_file_sha256: snapshot,
        };
        let result = verify_against(dir.path(), &baseline).expect("verify");
        assert!(result.ok);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn detects_modified_deleted_and_added_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("kept.py"), b"new").expect("write");
        std::fs::write(dir.path().join("fresh.py"), b"fresh").expect("write");
        let baseline = baseline_of(&[("kept.py", "oldhash"), ("gone.py", "oldhash2")]);
        let result = verify_against(dir.path(), &baseline).expect("verify");
        assert!(!result.ok);
        assert_eq!(result.modified, vec!["kept.py".to_owned()]);
        assert_eq!(result.deleted, vec!["gone.py".to_owned()]);
        assert_eq!(result.added, vec!["fresh.py".to_owned()]);
    }

    #[test]
    fn missing_baseline_is_ok_false_not_a_panic() {
        let result = missing_baseline_result("nope");
        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
    }
}
