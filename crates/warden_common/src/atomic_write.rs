// SPDX-License-Identifier: Apache-2.0

//! Atomic file writes (temp file + rename), used by every component that
//! persists an evidence artifact so a reader never observes a partially
//! written file.

use std::io::Write;
use std::path::Path;

/// Writes `contents` to `path` atomically: the bytes land in a temp file
/// created alongside `path` (same directory, so the final rename stays on
/// one filesystem), then the temp file is renamed over `path`.
///
/// Creates parent directories if they do not already exist.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_overwrites_atomically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("evidence.json");

        write_atomic(&path, b"first").expect("first write");
        assert_eq!(std::fs::read(&path).expect("read"), b"first");

        write_atomic(&path, b"second").expect("second write");
        assert_eq!(std::fs::read(&path).expect("read"), b"second");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("dir").join("evidence.json");

        write_atomic(&path, b"payload").expect("write");
        assert_eq!(std::fs::read(&path).expect("read"), b"payload");
    }
}
