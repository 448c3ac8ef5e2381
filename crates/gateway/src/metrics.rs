use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking orchestrated action outcomes.
///
/// All counters use relaxed ordering. For a point-in-time view, call
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    /// Actions that entered the orchestrator after input validation.
    pub requested: AtomicU64,
    /// Actions that passed the gate, fetched data, and awarded points.
    pub completed: AtomicU64,
    /// Actions whose provider fetch failed or timed out.
    pub failed: AtomicU64,
    /// Completed actions that were served synthetic data.
    pub fallbacks: AtomicU64,
    /// Actions rejected by the daily quota.
    pub quota_rejected: AtomicU64,
    /// Sum of points awarded by completed actions.
    pub points_awarded: AtomicU64,
}

impl GatewayMetrics {
    pub fn increment_requested(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_quota_rejected(&self) {
        self.quota_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_points_awarded(&self, points: u64) {
        self.points_awarded.fetch_add(points, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requested: self.requested.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            quota_rejected: self.quota_rejected.load(Ordering::Relaxed),
            points_awarded: self.points_awarded.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`GatewayMetrics`] at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requested: u64,
    pub completed: u64,
    pub failed: u64,
    pub fallbacks: u64,
    pub quota_rejected: u64,
    pub points_awarded: u64,
}
