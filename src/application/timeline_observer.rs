// Telemetry hooks at the controller and cache boundaries
use crate::domain::error::DashaError;
use crate::domain::period::{DashaLevel, PeriodId};

/// Every hook defaults to a no-op so implementors only pick what they need.
/// `parent` is `None` for the top-level Mahadasha fetch.
pub trait TimelineObserver: Send + Sync {
    fn fetch_started(&self, _level: DashaLevel, _parent: Option<&PeriodId>) {}

    fn fetch_succeeded(&self, _level: DashaLevel, _parent: Option<&PeriodId>, _count: usize) {}

    fn fetch_failed(&self, _level: DashaLevel, _parent: Option<&PeriodId>, _error: &DashaError) {}

    fn cache_hit(&self, _id: &PeriodId) {}

    fn cache_miss(&self, _id: &PeriodId) {}

    fn cache_reset(&self, _entries: usize) {}

    /// A response arrived after the tree it belonged to was discarded
    fn stale_result(&self, _level: DashaLevel, _parent: Option<&PeriodId>) {}
}

/// Production observer that forwards every hook to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl TimelineObserver for TracingObserver {
    fn fetch_started(&self, level: DashaLevel, parent: Option<&PeriodId>) {
        tracing::debug!(%level, parent = parent.map(|p| p.as_str()), "Fetching periods");
    }

    fn fetch_succeeded(&self, level: DashaLevel, parent: Option<&PeriodId>, count: usize) {
        tracing::info!(%level, parent = parent.map(|p| p.as_str()), count, "Fetched periods");
    }

    fn fetch_failed(&self, level: DashaLevel, parent: Option<&PeriodId>, error: &DashaError) {
        tracing::error!(%level, parent = parent.map(|p| p.as_str()), %error, "Period fetch failed");
    }

    fn cache_hit(&self, id: &PeriodId) {
        tracing::debug!(id = id.as_str(), "Expansion cache hit");
    }

    fn cache_miss(&self, id: &PeriodId) {
        tracing::debug!(id = id.as_str(), "Expansion cache miss");
    }

    fn cache_reset(&self, entries: usize) {
        tracing::debug!(entries, "Expansion cache reset");
    }

    fn stale_result(&self, level: DashaLevel, parent: Option<&PeriodId>) {
        tracing::warn!(%level, parent = parent.map(|p| p.as_str()), "Dropping stale period result");
    }
}
