//! # subsync-engine
//!
//! The reconciliation engine: scans the local project folder, computes the
//! three-way diff between local files, the persisted manifest, and the
//! remote caption state, then executes the resulting plan through the
//! gateway and rewrites the manifest once with the successful outcomes.
//!
//! Call [`run_sync`] for a full sync run, or [`create_project`] to
//! initialize a new project manifest.

pub mod error;
pub mod plan;
pub mod runner;
pub mod scan;

pub use error::SyncError;
pub use plan::{build_plan, ActionKind, Conflict, Plan, PlannedAction};
pub use runner::{
    create_project, run_sync, ActionReport, CancelFlag, ListingFailure, Outcome, SyncOptions,
    SyncReport,
};
pub use scan::{fingerprint, scan_project, ScanOutcome, SkippedFile};
