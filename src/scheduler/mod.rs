//! Background refresh of the published container snapshot.
//!
//! [`RefreshScheduler`] owns a [`Collector`] and runs it on a fixed interval in
//! a dedicated tokio task. Every cycle either replaces the published snapshot
//! or counts a failure; readers obtain consistent point-in-time copies through
//! a [`SnapshotReader`] without ever waiting for a running refresh.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::collector::{self, Collector};
use crate::runtime::Connector;

mod published;

pub use published::{Reading, SnapshotReader};

use published::Publisher;

/// Smallest accepted refresh interval; shorter intervals are raised to it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of a [`RefreshScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Stopped,
    Starting,
    Running,
    Stopping,
}

struct Worker {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Periodically refreshes the container snapshot in the background.
pub struct RefreshScheduler<C: Connector> {
    collector: Arc<Mutex<Collector<C>>>,
    interval: Duration,
    publisher: Publisher,
    worker: Option<Worker>,
    state: State,
}

impl<C: Connector> RefreshScheduler<C> {
    /// Creates a stopped scheduler.
    ///
    /// `interval` is raised to [`MIN_REFRESH_INTERVAL`] if it is shorter.
    pub fn new(collector: Collector<C>, interval: Duration) -> Self {
        Self {
            collector: Arc::new(Mutex::new(collector)),
            interval: interval.max(MIN_REFRESH_INTERVAL),
            publisher: Publisher::default(),
            worker: None,
            state: State::Stopped,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Returns a handle for reading the published snapshot.
    pub fn reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    /// Connects the collector and spawns the refresh loop.
    ///
    /// Returns once the runtime connection is established; the first refresh
    /// runs in the background. Does nothing if the scheduler is already running.
    ///
    /// # Errors
    ///
    /// Returns the connection error if the collector cannot be started. The
    /// scheduler stays stopped in that case.
    pub async fn start(&mut self) -> collector::Result<()> {
        if self.state != State::Stopped {
            log::debug!("Refresh scheduler already running");
            return Ok(());
        }
        self.state = State::Starting;

        if let Err(err) = self.collector.lock().await.start() {
            self.state = State::Stopped;
            return Err(err);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(refresh_loop(
            Arc::clone(&self.collector),
            self.publisher.clone(),
            self.interval,
            stop_rx,
        ));
        self.worker = Some(Worker { stop_tx, task });
        self.state = State::Running;
        log::info!(
            "Started refresh loop with an interval of {:?}",
            self.interval
        );

        Ok(())
    }

    /// Stops the refresh loop and releases the runtime connection.
    ///
    /// A sleeping loop exits immediately, a refresh in progress is allowed to
    /// finish first. Safe to call on a scheduler that was never started.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.state = State::Stopping;
            // fails only if the loop is already gone
            let _ = worker.stop_tx.send(true);
            if let Err(err) = worker.task.await {
                log::error!("refresh loop terminated abnormally: {}", err);
            }
            log::info!("Stopped refresh loop");
        }

        self.collector.lock().await.stop();
        self.state = State::Stopped;
    }
}

async fn refresh_loop<C: Connector>(
    collector: Arc<Mutex<Collector<C>>>,
    publisher: Publisher,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        if *stop_rx.borrow_and_update() {
            break;
        }

        let started = Instant::now();
        let result = collector.lock().await.collect().await;
        let elapsed = started.elapsed();
        match result {
            Ok(snapshot) => {
                log::debug!(
                    "Refreshed {} containers in {:?}",
                    snapshot.len(),
                    elapsed
                );
                publisher.publish_success(snapshot, Instant::now(), elapsed);
            }
            Err(err) => {
                log::warn!("Failed to refresh container health: {}", err);
                publisher.publish_failure(elapsed);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    // scheduler dropped without stopping
                    break;
                }
            }
        }
    }
}
