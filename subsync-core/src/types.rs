//! Domain types for the subsync manifest and reconciliation engine.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. All persisted types are serializable via serde + serde_json with
//! stable field names.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed video identifier on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoId(pub String);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A caption-track language code (already normalized, see [`crate::lang`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageCode(pub String);

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LanguageCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LanguageCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A channel identifier on the remote platform (`UC…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque id of a caption track on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptionId(pub String);

impl fmt::Display for CaptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CaptionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CaptionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// SubtitleKey
// ---------------------------------------------------------------------------

/// Composite identity of one subtitle track slot: `(video, language)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubtitleKey {
    pub video: VideoId,
    pub language: LanguageCode,
}

impl SubtitleKey {
    pub fn new(video: impl Into<VideoId>, language: impl Into<LanguageCode>) -> Self {
        Self {
            video: video.into(),
            language: language.into(),
        }
    }

    /// Stable string form used as the manifest entry key: `"<video>/<lang>"`.
    ///
    /// Video ids and language codes never contain `/` on the platform, so
    /// the split is unambiguous.
    pub fn entry_key(&self) -> String {
        format!("{}/{}", self.video, self.language)
    }

    /// Inverse of [`SubtitleKey::entry_key`].
    pub fn from_entry_key(key: &str) -> Option<Self> {
        let (video, language) = key.split_once('/')?;
        if video.is_empty() || language.is_empty() {
            return None;
        }
        Some(Self::new(video, language))
    }
}

impl fmt::Display for SubtitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.video, self.language)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A video on the remote platform, as returned by the channel listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: VideoId,
    pub title: String,
}

/// One subtitle file found on disk during a sync scan. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub key: SubtitleKey,
    pub file_path: PathBuf,
    /// SHA-256 hex digest of the file content.
    pub content_fingerprint: String,
    pub modified: DateTime<Utc>,
}

/// Persisted record of what we believe is on the remote platform as of the
/// last successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub remote_caption_id: CaptionId,
    pub content_fingerprint: String,
    pub last_synced: DateTime<Utc>,
}

/// A caption track as reported by the remote platform. Transient; re-derived
/// from the gateway on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub key: SubtitleKey,
    pub remote_caption_id: CaptionId,
    pub last_updated: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The persisted `subtitles.json` document: last-known-synced mapping of
/// subtitle keys to remote caption tracks for one project.
///
/// Entries are keyed by [`SubtitleKey::entry_key`] in a `BTreeMap` so the
/// serialized form is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub const CURRENT_VERSION: u32 = 1;

    /// A fresh manifest with no synced entries.
    pub fn empty(channel_id: ChannelId) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            channel_id,
            entries: BTreeMap::new(),
        }
    }

    pub fn entry(&self, key: &SubtitleKey) -> Option<&ManifestEntry> {
        self.entries.get(&key.entry_key())
    }

    pub fn insert(&mut self, key: &SubtitleKey, entry: ManifestEntry) {
        self.entries.insert(key.entry_key(), entry);
    }

    pub fn remove(&mut self, key: &SubtitleKey) -> Option<ManifestEntry> {
        self.entries.remove(&key.entry_key())
    }

    /// All keys currently tracked, in deterministic order. Entries whose key
    /// string does not parse (hand-edited manifests) are skipped.
    pub fn subtitle_keys(&self) -> Vec<SubtitleKey> {
        self.entries
            .keys()
            .filter_map(|k| SubtitleKey::from_entry_key(k))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(VideoId::from("abc123").to_string(), "abc123");
        assert_eq!(LanguageCode::from("en").to_string(), "en");
        assert_eq!(CaptionId::from("cap-9").to_string(), "cap-9");
    }

    #[test]
    fn entry_key_roundtrip() {
        let key = SubtitleKey::new("abc123", "pt-BR");
        let s = key.entry_key();
        assert_eq!(s, "abc123/pt-BR");
        assert_eq!(SubtitleKey::from_entry_key(&s), Some(key));
    }

    #[test]
    fn entry_key_rejects_malformed() {
        assert_eq!(SubtitleKey::from_entry_key("no-slash"), None);
        assert_eq!(SubtitleKey::from_entry_key("/en"), None);
        assert_eq!(SubtitleKey::from_entry_key("abc123/"), None);
    }

    #[test]
    fn manifest_insert_lookup_remove() {
        let mut manifest = Manifest::empty(ChannelId::from("UCxyz"));
        let key = SubtitleKey::new("abc123", "en");
        let entry = ManifestEntry {
            remote_caption_id: CaptionId::from("cap-1"),
            content_fingerprint: "deadbeef".to_string(),
            last_synced: Utc::now(),
        };
        manifest.insert(&key, entry.clone());
        assert_eq!(manifest.entry(&key), Some(&entry));
        assert_eq!(manifest.subtitle_keys(), vec![key.clone()]);
        assert_eq!(manifest.remove(&key), Some(entry));
        assert!(manifest.is_empty());
    }

    #[test]
    fn manifest_serde_roundtrip_has_stable_fields() {
        let mut manifest = Manifest::empty(ChannelId::from("UCxyz"));
        manifest.insert(
            &SubtitleKey::new("abc123", "en"),
            ManifestEntry {
                remote_caption_id: CaptionId::from("cap-1"),
                content_fingerprint: "deadbeef".to_string(),
                last_synced: Utc::now(),
            },
        );
        let json = serde_json::to_string_pretty(&manifest).expect("serialize");
        assert!(json.contains("\"channel_id\""));
        assert!(json.contains("\"remote_caption_id\""));
        assert!(json.contains("\"content_fingerprint\""));
        assert!(json.contains("\"last_synced\""));
        let back: Manifest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, manifest);
    }
}
