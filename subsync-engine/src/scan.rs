//! Local folder scan.
//!
//! Walks the project directory for `VIDEOID_LANGUAGE.<ext>` subtitle files
//! and turns each into a [`LocalEntry`] with a SHA-256 content fingerprint.
//! Fingerprints are over the raw bytes — subtitle files are opaque blobs
//! here, and a content hash (not mtime alone) means identical re-saves do
//! not trigger spurious updates.
//!
//! Subtitle-extension files that don't match the naming convention are
//! skipped with a reason, never a hard error. Other files are ignored
//! silently.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use subsync_core::filename::{self, ParsedFilename};
use subsync_core::lang;
use subsync_core::types::{LocalEntry, SubtitleKey};

use crate::error::{io_err, SyncError};

/// A local file excluded from the scan set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// Result of scanning a project folder.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub entries: Vec<LocalEntry>,
    pub skipped: Vec<SkippedFile>,
}

/// SHA-256 hex digest of raw content.
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Scan `project_dir` (recursively) for subtitle files.
///
/// Entries come back sorted by key. When two files map to the same key
/// (e.g. an `.srt` and a `.vtt` for the same video/language), the first in
/// path order wins and the rest are skipped.
pub fn scan_project(project_dir: &Path) -> Result<ScanOutcome, SyncError> {
    let mut files = Vec::new();
    collect_files(project_dir, &mut files)?;
    files.sort();

    let mut by_key: BTreeMap<SubtitleKey, LocalEntry> = BTreeMap::new();
    let mut skipped = Vec::new();

    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filename::has_subtitle_extension(file_name) {
            continue;
        }
        let key = match filename::parse(file_name) {
            ParsedFilename::Parsed { key } => key,
            ParsedFilename::Invalid { reason } => {
                tracing::warn!("skipping {file_name}: {reason}");
                skipped.push(SkippedFile {
                    file_name: file_name.to_string(),
                    reason,
                });
                continue;
            }
        };
        if !lang::is_supported(&key.language.0) {
            tracing::warn!(
                "'{file_name}': language code '{}' may not be accepted by the platform",
                key.language
            );
        }
        if by_key.contains_key(&key) {
            skipped.push(SkippedFile {
                file_name: file_name.to_string(),
                reason: format!("duplicate subtitle file for {key}"),
            });
            continue;
        }

        let content = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
        let metadata = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| io_err(&path, e))?
            .into();

        by_key.insert(
            key.clone(),
            LocalEntry {
                key,
                file_path: path,
                content_fingerprint: fingerprint(&content),
                modified,
            },
        );
    }

    Ok(ScanOutcome {
        entries: by_key.into_values().collect(),
        skipped,
    })
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<(), SyncError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_picks_up_well_named_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("abc123_en.srt"), "1\nhello\n").unwrap();
        std::fs::write(tmp.path().join("abc123_fr.srt"), "1\nbonjour\n").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignore me").unwrap();

        let outcome = scan_project(tmp.path()).unwrap();
        assert_eq!(outcome.entries.len(), 2);
        assert!(outcome.skipped.is_empty());
        let keys: Vec<String> = outcome.entries.iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["abc123/en", "abc123/fr-FR"]);
    }

    #[test]
    fn invalid_names_are_skipped_with_reason() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("noseparator.srt"), "x").unwrap();
        std::fs::write(tmp.path().join("abc123_en.srt"), "x").unwrap();

        let outcome = scan_project(tmp.path()).unwrap();
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].file_name, "noseparator.srt");
    }

    #[test]
    fn identical_content_has_identical_fingerprint() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("abc123_en.srt"), "same").unwrap();
        let first = scan_project(tmp.path()).unwrap().entries[0]
            .content_fingerprint
            .clone();

        // Re-save the identical bytes; the fingerprint must not move.
        std::fs::write(tmp.path().join("abc123_en.srt"), "same").unwrap();
        let second = scan_project(tmp.path()).unwrap().entries[0]
            .content_fingerprint
            .clone();
        assert_eq!(first, second);

        std::fs::write(tmp.path().join("abc123_en.srt"), "different").unwrap();
        let third = scan_project(tmp.path()).unwrap().entries[0]
            .content_fingerprint
            .clone();
        assert_ne!(first, third);
    }

    #[test]
    fn nested_directories_are_scanned() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("season1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("abc123_en.srt"), "x").unwrap();

        let outcome = scan_project(tmp.path()).unwrap();
        assert_eq!(outcome.entries.len(), 1);
    }

    #[test]
    fn duplicate_key_across_extensions_is_skipped() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("abc123_en.srt"), "a").unwrap();
        std::fs::write(tmp.path().join("abc123_en.vtt"), "b").unwrap();

        let outcome = scan_project(tmp.path()).unwrap();
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.contains("duplicate"));
    }
}
