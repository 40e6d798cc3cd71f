//! Plan execution and sync orchestration.
//!
//! ## Sync run — 6 steps
//!
//! 1. Load the manifest (aborts with `ProjectNotFound` if absent).
//! 2. Scan the local folder.
//! 3. Fetch caption listings for every video referenced by local files or
//!    the manifest — bounded concurrency, cache-deduplicated.
//! 4. Build the plan (three-way diff).
//! 5. Execute actions sequentially: DELETE/PRUNE, then UPDATE, then UPLOAD.
//!    A failed action is recorded and skipped; the rest proceed.
//! 6. Rewrite the manifest once with the successful outcomes.
//!
//! Failed actions leave their manifest entry untouched, so a re-run retries
//! them naturally.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use subsync_core::manifest;
use subsync_core::types::{ChannelId, LocalEntry, Manifest, ManifestEntry, SubtitleKey, VideoId, VideoRef};
use subsync_gateway::{Gateway, GatewayError, QuotaSummary, RemoteApi};

use crate::error::SyncError;
use crate::plan::{build_plan, ActionKind, Conflict, PlannedAction};
use crate::scan::{scan_project, SkippedFile};

/// Listings for distinct videos are independent and idempotent, so the
/// pre-plan phase may keep a handful in flight at once.
const LISTING_CONCURRENCY: usize = 6;

// ---------------------------------------------------------------------------
// Options and report types
// ---------------------------------------------------------------------------

/// Cooperative cancellation: stops issuing new actions, never interrupts an
/// in-flight remote call.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute and report the plan without executing any write or touching
    /// the manifest.
    pub dry_run: bool,
    pub cancel: CancelFlag,
}

/// Terminal outcome of one planned action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
    /// Not executed — cancellation arrived before this action started.
    Skipped(String),
    /// `--dry-run` mode: the action *would* have executed.
    WouldRun,
}

/// One executed (or skipped) plan entry.
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub action: PlannedAction,
    pub outcome: Outcome,
}

/// A caption listing that could not be fetched during the pre-plan phase.
/// The video's keys are excluded from the plan; a re-run retries them.
#[derive(Debug, Clone)]
pub struct ListingFailure {
    pub video: VideoId,
    pub error: String,
}

/// Everything a caller needs to report one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub actions: Vec<ActionReport>,
    pub conflicts: Vec<Conflict>,
    pub skipped_files: Vec<SkippedFile>,
    pub listing_failures: Vec<ListingFailure>,
    pub quota: QuotaSummary,
}

impl SyncReport {
    /// Whether the process exit status should be non-zero.
    pub fn has_failures(&self) -> bool {
        !self.listing_failures.is_empty()
            || self
                .actions
                .iter()
                .any(|r| matches!(r.outcome, Outcome::Failed(_)))
    }
}

// ---------------------------------------------------------------------------
// Manifest patch
// ---------------------------------------------------------------------------

/// Mutation observed during execution, applied to the manifest afterwards.
/// The engine never mutates the loaded manifest mid-run — the commit
/// boundary is a single save after all actions have attempted execution.
#[derive(Debug, Clone)]
enum ManifestPatch {
    Upsert(SubtitleKey, ManifestEntry),
    Remove(SubtitleKey),
}

// ---------------------------------------------------------------------------
// run_sync
// ---------------------------------------------------------------------------

/// Run a full sync of `project_dir` against `channel`.
pub fn run_sync<R: RemoteApi>(
    project_dir: &Path,
    channel: &ChannelId,
    gateway: &Gateway<R>,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let loaded = manifest::load(project_dir)?;
    if &loaded.channel_id != channel {
        return Err(SyncError::ChannelMismatch {
            manifest: loaded.channel_id,
            requested: channel.clone(),
        });
    }

    let scan = scan_project(project_dir)?;

    // One caption listing per distinct video referenced by either side —
    // never a full-channel listing, to conserve quota.
    let mut videos: BTreeSet<VideoId> =
        scan.entries.iter().map(|e| e.key.video.clone()).collect();
    videos.extend(loaded.subtitle_keys().into_iter().map(|k| k.video));
    let videos: Vec<VideoId> = videos.into_iter().collect();

    let mut remote_entries = Vec::new();
    let mut listing_failures = Vec::new();
    let mut failed_videos: BTreeSet<VideoId> = BTreeSet::new();
    for (video, result) in fetch_listings(gateway, &videos) {
        match result {
            Ok(tracks) => remote_entries.extend(tracks),
            Err(err) => {
                tracing::warn!("caption listing failed for {video}: {err}");
                failed_videos.insert(video.clone());
                listing_failures.push(ListingFailure {
                    video,
                    error: err.to_string(),
                });
            }
        }
    }

    // Keys on videos we could not list have an unknown remote side; plan
    // nothing for them.
    let local: Vec<LocalEntry> = scan
        .entries
        .into_iter()
        .filter(|e| !failed_videos.contains(&e.key.video))
        .collect();
    let mut plan_view = loaded.clone();
    for key in loaded.subtitle_keys() {
        if failed_videos.contains(&key.video) {
            plan_view.remove(&key);
        }
    }

    let plan = build_plan(&local, &plan_view, &remote_entries);
    tracing::info!(
        "plan for {}: {} action(s), {} conflict(s)",
        project_dir.display(),
        plan.actions.len(),
        plan.conflicts.len()
    );

    let mut patches = Vec::new();
    let mut reports = Vec::new();
    for action in plan.actions {
        let outcome = if options.cancel.is_cancelled() {
            Outcome::Skipped("cancelled before execution".to_string())
        } else if options.dry_run {
            Outcome::WouldRun
        } else {
            tracing::debug!("executing {} {}", action.kind, action.key);
            match execute_action(gateway, &action) {
                Ok(patch) => {
                    patches.push(patch);
                    Outcome::Succeeded
                }
                Err(message) => {
                    tracing::warn!("{} {} failed: {message}", action.kind, action.key);
                    Outcome::Failed(message)
                }
            }
        };
        reports.push(ActionReport { action, outcome });
    }

    // Single manifest rewrite, successful outcomes only.
    if !options.dry_run && !patches.is_empty() {
        let mut updated = loaded;
        for patch in patches {
            match patch {
                ManifestPatch::Upsert(key, entry) => updated.insert(&key, entry),
                ManifestPatch::Remove(key) => {
                    updated.remove(&key);
                }
            }
        }
        manifest::save(project_dir, &updated)?;
    }

    Ok(SyncReport {
        actions: reports,
        conflicts: plan.conflicts,
        skipped_files: scan.skipped,
        listing_failures,
        quota: gateway.quota_summary(),
    })
}

/// Execute one action. Returns the manifest mutation on success, or a
/// human-readable failure message — per-action failures never abort the
/// run. No action is retried within a single invocation.
fn execute_action<R: RemoteApi>(
    gateway: &Gateway<R>,
    action: &PlannedAction,
) -> Result<ManifestPatch, String> {
    match action.kind {
        ActionKind::Upload => {
            let (path, fp) = file_inputs(action)?;
            let content = std::fs::read(path).map_err(|e| e.to_string())?;
            let id = gateway
                .upload_caption(&action.key.video, &action.key.language, &content)
                .map_err(describe)?;
            Ok(ManifestPatch::Upsert(
                action.key.clone(),
                ManifestEntry {
                    remote_caption_id: id,
                    content_fingerprint: fp.to_string(),
                    last_synced: Utc::now(),
                },
            ))
        }
        ActionKind::Update => {
            let (path, fp) = file_inputs(action)?;
            let caption = action
                .caption_id
                .as_ref()
                .ok_or_else(|| "plan entry missing caption id".to_string())?;
            let content = std::fs::read(path).map_err(|e| e.to_string())?;
            gateway
                .update_caption(caption, &action.key.video, &content)
                .map_err(describe)?;
            Ok(ManifestPatch::Upsert(
                action.key.clone(),
                ManifestEntry {
                    remote_caption_id: caption.clone(),
                    content_fingerprint: fp.to_string(),
                    last_synced: Utc::now(),
                },
            ))
        }
        ActionKind::Delete => {
            let caption = action
                .caption_id
                .as_ref()
                .ok_or_else(|| "plan entry missing caption id".to_string())?;
            gateway
                .delete_caption(caption, &action.key.video)
                .map_err(describe)?;
            Ok(ManifestPatch::Remove(action.key.clone()))
        }
        // Manifest-only: the remote side is already gone.
        ActionKind::Prune => Ok(ManifestPatch::Remove(action.key.clone())),
    }
}

fn file_inputs(action: &PlannedAction) -> Result<(&Path, &str), String> {
    let path = action
        .file_path
        .as_deref()
        .ok_or_else(|| "plan entry missing file path".to_string())?;
    let fp = action
        .fingerprint
        .as_deref()
        .ok_or_else(|| "plan entry missing fingerprint".to_string())?;
    Ok((path, fp))
}

fn describe(err: GatewayError) -> String {
    err.to_string()
}

// ---------------------------------------------------------------------------
// Listing prefetch
// ---------------------------------------------------------------------------

/// Fetch caption listings for `videos`, at most [`LISTING_CONCURRENCY`] in
/// flight. Results keep video order; each video's failure is isolated.
fn fetch_listings<R: RemoteApi>(
    gateway: &Gateway<R>,
    videos: &[VideoId],
) -> Vec<(VideoId, Result<Vec<subsync_core::types::RemoteEntry>, GatewayError>)> {
    let mut results = Vec::with_capacity(videos.len());
    for chunk in videos.chunks(LISTING_CONCURRENCY) {
        let chunk_results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|video| {
                    scope.spawn(move || (video.clone(), gateway.list_caption_tracks(video)))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("listing thread panicked"))
                .collect()
        });
        results.extend(chunk_results);
    }
    results
}

// ---------------------------------------------------------------------------
// create_project
// ---------------------------------------------------------------------------

/// Initialize a new project: list the channel's current videos as an
/// informational seed, then write an empty manifest.
///
/// No manifest entries are created for existing remote state — entries are
/// created only by a subsequent sync.
pub fn create_project<R: RemoteApi>(
    project_dir: &Path,
    channel: &ChannelId,
    gateway: &Gateway<R>,
) -> Result<(Manifest, Vec<VideoRef>), SyncError> {
    // Listing first also validates the channel before anything is created.
    let videos = gateway.list_videos(channel)?;
    let manifest = manifest::create(project_dir, channel.clone())?;
    tracing::info!(
        "created project at {} ({} video(s) on channel)",
        project_dir.display(),
        videos.len()
    );
    Ok((manifest, videos))
}
