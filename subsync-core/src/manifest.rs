//! Manifest store — persistence for the project's `subtitles.json`.
//!
//! The manifest is the last-known-synced mapping of subtitle keys to remote
//! caption tracks. Saves use an atomic `.tmp` + rename so a crash mid-write
//! never leaves a corrupt manifest. The store performs no remote calls.

use std::path::{Path, PathBuf};

use crate::error::{io_err, ManifestError};
use crate::types::{ChannelId, Manifest};

/// Manifest filename inside a project directory.
pub const MANIFEST_FILE: &str = "subtitles.json";

/// `<project_dir>/subtitles.json` — pure, no I/O.
pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_FILE)
}

/// Load the manifest for a project.
///
/// Returns [`ManifestError::ProjectNotFound`] if no manifest file exists —
/// a freshly created project's manifest is empty but present.
pub fn load(project_dir: &Path) -> Result<Manifest, ManifestError> {
    let path = manifest_path(project_dir);
    if !path.exists() {
        return Err(ManifestError::ProjectNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|e| ManifestError::Parse { path, source: e })
}

/// Save the manifest atomically.
///
/// Write flow: serialize → `subtitles.json.tmp` sibling → `rename`. The
/// `.tmp` lives in the same directory as the target (same filesystem — no
/// EXDEV surprises).
pub fn save(project_dir: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    std::fs::create_dir_all(project_dir).map_err(|e| io_err(project_dir, e))?;
    let path = manifest_path(project_dir);
    let tmp = path.with_extension("json.tmp");

    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

/// Create a fresh, empty manifest for a new project.
///
/// Fails if a manifest already exists at the location.
pub fn create(project_dir: &Path, channel_id: ChannelId) -> Result<Manifest, ManifestError> {
    let path = manifest_path(project_dir);
    if path.exists() {
        return Err(io_err(
            &path,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "manifest already exists",
            ),
        ));
    }
    let manifest = Manifest::empty(channel_id);
    save(project_dir, &manifest)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaptionId, ManifestEntry, SubtitleKey};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn load_missing_manifest_is_project_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load(tmp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::ProjectNotFound { .. }));
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = Manifest::empty(ChannelId::from("UCxyz"));
        manifest.insert(
            &SubtitleKey::new("abc123", "en"),
            ManifestEntry {
                remote_caption_id: CaptionId::from("cap-1"),
                content_fingerprint: "deadbeef".to_string(),
                last_synced: Utc::now(),
            },
        );

        save(tmp.path(), &manifest).unwrap();
        let loaded = load(tmp.path()).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        save(tmp.path(), &Manifest::empty(ChannelId::from("UCxyz"))).unwrap();
        let tmp_path = manifest_path(tmp.path()).with_extension("json.tmp");
        assert!(
            !tmp_path.exists(),
            "tmp file should be removed after atomic rename"
        );
    }

    #[test]
    fn create_writes_empty_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = create(tmp.path(), ChannelId::from("UCxyz")).unwrap();
        assert!(manifest.is_empty());
        let loaded = load(tmp.path()).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn create_refuses_existing_manifest() {
        let tmp = TempDir::new().unwrap();
        create(tmp.path(), ChannelId::from("UCxyz")).unwrap();
        assert!(create(tmp.path(), ChannelId::from("UCxyz")).is_err());
    }

    #[test]
    fn corrupt_manifest_is_a_parse_error_with_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(manifest_path(tmp.path()), "{not json").unwrap();
        let err = load(tmp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }
}
