use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::container::Snapshot;

/// Immutable result of the latest refresh attempt, swapped as a whole.
#[derive(Debug, Default)]
struct Published {
    snapshot: Arc<Snapshot>,
    last_success: Option<Instant>,
    failures: u64,
    last_duration: Duration,
    up: bool,
}

type Shared = Arc<RwLock<Arc<Published>>>;

/// Point-in-time view of the engine state.
#[derive(Debug, Clone)]
pub struct Reading {
    /// Latest successfully collected snapshot, empty before the first success.
    pub snapshot: Arc<Snapshot>,
    /// Whether the most recent refresh attempt succeeded.
    pub up: bool,
    /// Cumulative number of failed refresh attempts.
    pub failures: u64,
    /// Duration of the most recent refresh attempt.
    pub last_duration: Duration,
    /// Time since the last successful refresh, `None` if there was none yet.
    pub age: Option<Duration>,
}

/// Cloneable read-only handle to the published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    shared: Shared,
}

impl SnapshotReader {
    /// Returns the current snapshot and refresh metrics.
    ///
    /// Never blocks on a running refresh; the snapshot and metrics always
    /// belong to the same refresh cycle.
    pub fn read(&self) -> Reading {
        let published = Arc::clone(&self.shared.read().unwrap_or_else(PoisonError::into_inner));
        Reading {
            snapshot: Arc::clone(&published.snapshot),
            up: published.up,
            failures: published.failures,
            last_duration: published.last_duration,
            age: published
                .last_success
                .map(|at| Instant::now().saturating_duration_since(at)),
        }
    }
}

/// Writing side owned by the refresh loop.
#[derive(Debug, Clone, Default)]
pub(super) struct Publisher {
    shared: Shared,
}

impl Publisher {
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Replaces the snapshot and marks the exporter as up.
    pub fn publish_success(&self, snapshot: Snapshot, at: Instant, duration: Duration) {
        let current = self.current();
        self.swap(Published {
            snapshot: Arc::new(snapshot),
            last_success: Some(at),
            failures: current.failures,
            last_duration: duration,
            up: true,
        });
    }

    /// Counts a failed refresh, keeping the previous snapshot.
    pub fn publish_failure(&self, duration: Duration) {
        let current = self.current();
        self.swap(Published {
            snapshot: Arc::clone(&current.snapshot),
            last_success: current.last_success,
            failures: current.failures + 1,
            last_duration: duration,
            up: false,
        });
    }

    fn current(&self) -> Arc<Published> {
        Arc::clone(&self.shared.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn swap(&self, next: Published) {
        *self.shared.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }
}
