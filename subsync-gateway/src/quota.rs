//! Session quota ledger.
//!
//! The ledger is an explicit object injected into the gateway, never a
//! process-wide global, so concurrent sync runs in library usage don't
//! cross-contaminate totals. It only reports; the platform is the authority
//! that actually rejects calls once the daily quota is gone.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// The platform's typical daily quota budget, in units. Reporting only.
pub const DAILY_QUOTA_BUDGET: u64 = 10_000;

/// One metered remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    ListVideos,
    ListCaptions,
    Upload,
    Update,
    Delete,
}

impl OperationKind {
    /// Fixed cost table, in quota units per call (not per byte).
    pub fn cost(self) -> u64 {
        match self {
            OperationKind::ListVideos => 1,
            OperationKind::ListCaptions => 50,
            OperationKind::Upload => 400,
            OperationKind::Update => 450,
            OperationKind::Delete => 50,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::ListVideos => "list-videos",
            OperationKind::ListCaptions => "list-captions",
            OperationKind::Upload => "upload",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// A recorded charge. Session-scoped; never persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaEvent {
    pub kind: OperationKind,
    pub cost: u64,
    pub at: DateTime<Utc>,
}

/// Per-kind rollup inside a [`QuotaSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindTotal {
    pub calls: u64,
    pub cost: u64,
}

/// Grouped session totals, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuotaSummary {
    pub by_kind: BTreeMap<OperationKind, KindTotal>,
}

impl QuotaSummary {
    pub fn total_cost(&self) -> u64 {
        self.by_kind.values().map(|t| t.cost).sum()
    }

    pub fn total_calls(&self) -> u64 {
        self.by_kind.values().map(|t| t.calls).sum()
    }
}

/// Append-only in-memory ledger of estimated quota charges.
///
/// Interior mutability so concurrent pre-plan listing fetches can share one
/// ledger behind `&self`.
#[derive(Debug, Default)]
pub struct QuotaLedger {
    events: Mutex<Vec<QuotaEvent>>,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one live call of `kind` at its fixed cost.
    pub fn record(&self, kind: OperationKind) {
        let event = QuotaEvent {
            kind,
            cost: kind.cost(),
            at: Utc::now(),
        };
        tracing::debug!("quota +{} for {}", event.cost, event.kind);
        self.events
            .lock()
            .expect("quota ledger poisoned")
            .push(event);
    }

    /// Total cost grouped by operation kind.
    pub fn summary(&self) -> QuotaSummary {
        let events = self.events.lock().expect("quota ledger poisoned");
        let mut by_kind: BTreeMap<OperationKind, KindTotal> = BTreeMap::new();
        for event in events.iter() {
            let total = by_kind.entry(event.kind).or_default();
            total.calls += 1;
            total.cost += event.cost;
        }
        QuotaSummary { by_kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_table_matches_platform_rates() {
        assert_eq!(OperationKind::ListVideos.cost(), 1);
        assert_eq!(OperationKind::ListCaptions.cost(), 50);
        assert_eq!(OperationKind::Upload.cost(), 400);
        assert_eq!(OperationKind::Update.cost(), 450);
        assert_eq!(OperationKind::Delete.cost(), 50);
    }

    #[test]
    fn summary_groups_by_kind() {
        let ledger = QuotaLedger::new();
        ledger.record(OperationKind::ListCaptions);
        ledger.record(OperationKind::ListCaptions);
        ledger.record(OperationKind::Upload);

        let summary = ledger.summary();
        assert_eq!(
            summary.by_kind[&OperationKind::ListCaptions],
            KindTotal { calls: 2, cost: 100 }
        );
        assert_eq!(
            summary.by_kind[&OperationKind::Upload],
            KindTotal { calls: 1, cost: 400 }
        );
        assert_eq!(summary.total_cost(), 500);
        assert_eq!(summary.total_calls(), 3);
    }

    #[test]
    fn empty_ledger_reports_zero() {
        let summary = QuotaLedger::new().summary();
        assert_eq!(summary.total_cost(), 0);
        assert!(summary.by_kind.is_empty());
    }
}
