//! Three-way diff and plan construction.
//!
//! For every subtitle key present in the union of local files, manifest
//! entries, and remote caption tracks, exactly one row of the action table
//! applies. New cases must be added to the table in [`build_plan`], never
//! inferred elsewhere.
//!
//! Plan ordering: DELETE and PRUNE first, then UPDATE, then UPLOAD. Within
//! a group, actions are ordered by key.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use subsync_core::types::{CaptionId, LocalEntry, Manifest, ManifestEntry, RemoteEntry, SubtitleKey};

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// What a planned action will do remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Create a new caption track from a local file.
    Upload,
    /// Replace an existing track's content from a local file.
    Update,
    /// Remove a remote track whose local file is gone.
    Delete,
    /// Drop a stale manifest entry; no remote call.
    Prune,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Upload => "UPLOAD",
            ActionKind::Update => "UPDATE",
            ActionKind::Delete => "DELETE",
            ActionKind::Prune => "PRUNE",
        };
        f.write_str(s)
    }
}

/// One entry of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub key: SubtitleKey,
    pub kind: ActionKind,
    /// Local file backing an UPLOAD/UPDATE.
    pub file_path: Option<PathBuf>,
    /// Fingerprint the manifest should record on success.
    pub fingerprint: Option<String>,
    /// Remote track an UPDATE/DELETE acts on.
    pub caption_id: Option<CaptionId>,
    /// Set when the action was derived from a manifest/remote divergence.
    pub note: Option<String>,
}

/// A manifest/remote divergence that produces no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub key: SubtitleKey,
    pub detail: String,
}

/// The ordered action plan for one sync run.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub actions: Vec<PlannedAction>,
    pub conflicts: Vec<Conflict>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// build_plan
// ---------------------------------------------------------------------------

/// Compute the plan from the three sides.
///
/// `remote` must hold the caption tracks of every video referenced by
/// `local` or the manifest (the runner excludes videos whose listing
/// failed before calling this).
///
/// The action table:
///
/// | local | manifest | remote | action |
/// |---|---|---|---|
/// | changed | ✓ | ✓ same id | UPDATE |
/// | unchanged | ✓ | ✓ same id | — |
/// | ✓ | ✗ | ✗ | UPLOAD |
/// | ✓ | ✗ | ✓ | UPDATE (adopt remote id) |
/// | ✓ | ✓ | ✗ | UPLOAD (manifest stale) |
/// | ✗ | ✓ | ✓ same id | DELETE |
/// | ✗ | ✓ | ✓ other id | PRUNE (conflict note) |
/// | ✗ | ✓ | ✗ | PRUNE |
/// | ✓ changed | ✓ | ✓ other id | UPDATE with refreshed id |
/// | ✓ unchanged | ✓ | ✓ other id | conflict, no action |
/// | ✗ | ✗ | ✓ | — (no manifest claim) |
pub fn build_plan(local: &[LocalEntry], manifest: &Manifest, remote: &[RemoteEntry]) -> Plan {
    let mut keys: BTreeMap<SubtitleKey, Sides<'_>> = BTreeMap::new();
    for entry in local {
        keys.entry(entry.key.clone()).or_default().local = Some(entry);
    }
    for (key_str, entry) in &manifest.entries {
        // Hand-edited manifests can hold unparseable keys; those entries are
        // invisible to the diff and survive untouched.
        if let Some(key) = SubtitleKey::from_entry_key(key_str) {
            keys.entry(key).or_default().manifest = Some(entry);
        }
    }
    for entry in remote {
        keys.entry(entry.key.clone()).or_default().remote = Some(entry);
    }

    let mut removals = Vec::new();
    let mut updates = Vec::new();
    let mut uploads = Vec::new();
    let mut conflicts = Vec::new();

    for (key, sides) in keys {
        match (sides.local, sides.manifest, sides.remote) {
            // Unchanged, or nothing we own.
            (None, None, _) => {}

            // New local file, never synced, nothing remote.
            (Some(l), None, None) => uploads.push(upload(key, l, None)),

            // New local file, but the platform already has a track in this
            // slot (created by another tool): adopt it instead of creating
            // a duplicate.
            (Some(l), None, Some(r)) => updates.push(PlannedAction {
                key,
                kind: ActionKind::Update,
                file_path: Some(l.file_path.clone()),
                fingerprint: Some(l.content_fingerprint.clone()),
                caption_id: Some(r.remote_caption_id.clone()),
                note: Some("adopting existing remote track".to_string()),
            }),

            // Manifest claims a track the remote no longer has: the track
            // was deleted out-of-band. Re-upload and treat as new.
            (Some(l), Some(_), None) => uploads.push(upload(
                key,
                l,
                Some("remote track missing; manifest was stale, re-uploading".to_string()),
            )),

            (Some(l), Some(m), Some(r)) => {
                let changed = l.content_fingerprint != m.content_fingerprint;
                if r.remote_caption_id == m.remote_caption_id {
                    if changed {
                        updates.push(PlannedAction {
                            key,
                            kind: ActionKind::Update,
                            file_path: Some(l.file_path.clone()),
                            fingerprint: Some(l.content_fingerprint.clone()),
                            caption_id: Some(m.remote_caption_id.clone()),
                            note: None,
                        });
                    }
                    // else: in sync, nothing to do.
                } else if changed {
                    // Track replaced out-of-band AND the local file moved on:
                    // update through the refreshed id from the listing.
                    updates.push(PlannedAction {
                        key,
                        kind: ActionKind::Update,
                        file_path: Some(l.file_path.clone()),
                        fingerprint: Some(l.content_fingerprint.clone()),
                        caption_id: Some(r.remote_caption_id.clone()),
                        note: Some(format!(
                            "remote track replaced out-of-band ({} is now {})",
                            m.remote_caption_id, r.remote_caption_id
                        )),
                    });
                } else {
                    // Replaced out-of-band but the local file is unchanged:
                    // remote is authoritative, report and leave it alone.
                    conflicts.push(Conflict {
                        key,
                        detail: format!(
                            "remote track replaced out-of-band ({} is now {}); \
                             local file unchanged, skipping",
                            m.remote_caption_id, r.remote_caption_id
                        ),
                    });
                }
            }

            // Local file removed since last sync.
            (None, Some(m), Some(r)) => {
                if r.remote_caption_id == m.remote_caption_id {
                    removals.push(PlannedAction {
                        key,
                        kind: ActionKind::Delete,
                        file_path: None,
                        fingerprint: None,
                        caption_id: Some(m.remote_caption_id.clone()),
                        note: None,
                    });
                } else {
                    // The id we own is gone; what's there now isn't ours to
                    // delete. Drop the stale claim.
                    removals.push(PlannedAction {
                        key,
                        kind: ActionKind::Prune,
                        file_path: None,
                        fingerprint: None,
                        caption_id: None,
                        note: Some(format!(
                            "remote track replaced out-of-band ({} is now {}); \
                             not deleting a track we do not own",
                            m.remote_caption_id, r.remote_caption_id
                        )),
                    });
                }
            }

            // Gone on both sides; the manifest is merely stale.
            (None, Some(_), None) => removals.push(PlannedAction {
                key,
                kind: ActionKind::Prune,
                file_path: None,
                fingerprint: None,
                caption_id: None,
                note: None,
            }),
        }
    }

    let mut actions = removals;
    actions.append(&mut updates);
    actions.append(&mut uploads);

    Plan { actions, conflicts }
}

fn upload(key: SubtitleKey, local: &LocalEntry, note: Option<String>) -> PlannedAction {
    PlannedAction {
        key,
        kind: ActionKind::Upload,
        file_path: Some(local.file_path.clone()),
        fingerprint: Some(local.content_fingerprint.clone()),
        caption_id: None,
        note,
    }
}

#[derive(Default)]
struct Sides<'a> {
    local: Option<&'a LocalEntry>,
    manifest: Option<&'a ManifestEntry>,
    remote: Option<&'a RemoteEntry>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
