//! Live Sync Scheduler
//!
//! Owns the refresh loop for the value-bet snapshot:
//! - Immediate refresh on start, then one timer at the current backoff
//! - Backoff reset on success, doubling (capped) on failure
//! - Visibility gating and immediate refresh on recovery
//! - Manual refresh that may overlap an in-flight attempt
//!
//! A single worker task is the only writer of `SyncState`; callers observe it
//! through a watch channel.

use crate::config::{ResponseOrdering, SyncConfig};
use crate::domain::ValueBetRecord;
use crate::error::{EdgewatchError, Result, TransportError};
use crate::sync::backoff::Backoff;
use crate::sync::fetcher::SnapshotFetcher;
use crate::sync::reconciler::reconcile_with_summary;
use crate::sync::state::{SyncState, SyncStatus};
use crate::sync::visibility::{Visibility, VisibilitySource};
use chrono::Utc;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type AttemptResult = (u64, std::result::Result<Vec<ValueBetRecord>, TransportError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    RefreshNow,
}

/// Builder for a sync session
pub struct SyncScheduler {
    fetcher: Arc<dyn SnapshotFetcher>,
    visibility: Arc<dyn VisibilitySource>,
    config: SyncConfig,
}

impl SyncScheduler {
    pub fn new(
        fetcher: Arc<dyn SnapshotFetcher>,
        visibility: Arc<dyn VisibilitySource>,
        config: SyncConfig,
    ) -> Self {
        Self {
            fetcher,
            visibility,
            config,
        }
    }

    /// Spawn the refresh loop. Must be called inside a tokio runtime.
    pub fn start(self, initial: Option<Vec<ValueBetRecord>>) -> SyncHandle {
        let backoff = Backoff::new(self.config.base_interval_ms, self.config.max_interval_ms);
        let (state_tx, state_rx) =
            watch::channel(SyncState::initial(initial, backoff.current_ms()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let visibility_rx = self.visibility.subscribe();

        info!(
            "SyncScheduler: starting (base={}ms max={}ms threshold={} ordering={:?})",
            backoff.current_ms(),
            backoff.max_ms(),
            self.config.edge_change_threshold,
            self.config.response_ordering
        );

        let worker = SyncWorker {
            fetcher: self.fetcher,
            visibility: self.visibility,
            config: self.config,
            backoff,
            state_tx,
            deadline: None,
            next_attempt_id: 0,
            latest_issued: None,
        };
        let task = tokio::spawn(worker.run(command_rx, shutdown_rx, visibility_rx));

        SyncHandle {
            state_rx,
            command_tx,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }
}

/// Caller-facing side of a running sync session.
///
/// Dropping the handle tears the session down as well.
pub struct SyncHandle {
    state_rx: watch::Receiver<SyncState>,
    command_tx: mpsc::UnboundedSender<Command>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncHandle {
    /// Snapshot of the current state
    pub fn state(&self) -> SyncState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }

    /// Reset backoff and refresh now, regardless of the pending timer
    pub fn refresh_now(&self) -> Result<()> {
        if *self.shutdown_tx.borrow() {
            return Err(EdgewatchError::SchedulerStopped);
        }
        self.command_tx
            .send(Command::RefreshNow)
            .map_err(|_| EdgewatchError::SchedulerStopped)
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Cancel the timer, detach the visibility observer and wait for the
    /// worker to exit. Idempotent.
    pub async fn stop(&self) {
        self.shutdown_tx.send_replace(true);
        let task = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("SyncScheduler: worker exited abnormally: {}", e);
            }
            info!("SyncScheduler: stopped");
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

struct SyncWorker {
    fetcher: Arc<dyn SnapshotFetcher>,
    visibility: Arc<dyn VisibilitySource>,
    config: SyncConfig,
    backoff: Backoff,
    state_tx: watch::Sender<SyncState>,
    /// The single outstanding timer, if any
    deadline: Option<Instant>,
    next_attempt_id: u64,
    latest_issued: Option<u64>,
}

impl SyncWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut shutdown: watch::Receiver<bool>,
        mut visibility: watch::Receiver<Visibility>,
    ) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, AttemptResult>> =
            FuturesUnordered::new();
        let mut seen_epoch = visibility.borrow_and_update().shown_epoch;
        let mut visibility_open = true;

        self.begin_attempt(&mut in_flight, "start");

        loop {
            let deadline = self.deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                // only ever flips false -> true; Err means the handle is gone
                _ = shutdown.changed() => break,

                cmd = commands.recv() => match cmd {
                    Some(Command::RefreshNow) => {
                        debug!("SyncScheduler: manual refresh");
                        self.reset_backoff();
                        self.begin_attempt(&mut in_flight, "manual");
                    }
                    None => break,
                },

                changed = visibility.changed(), if visibility_open => match changed {
                    Ok(()) => {
                        // A newer epoch means the view was shown again, even if
                        // the hidden phase in between was never observed here.
                        let current = *visibility.borrow_and_update();
                        if current.shown_epoch > seen_epoch && current.visible {
                            debug!("SyncScheduler: became visible, refreshing");
                            self.reset_backoff();
                            self.begin_attempt(&mut in_flight, "visible");
                        }
                        seen_epoch = current.shown_epoch;
                    }
                    Err(_) => visibility_open = false,
                },

                Some((attempt_id, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.resolve(attempt_id, result);
                }

                _ = tokio::time::sleep_until(deadline), if self.deadline.is_some() => {
                    self.deadline = None;
                    self.begin_attempt(&mut in_flight, "timer");
                }
            }
        }

        // Pending attempts are dropped with `in_flight`; nothing is published
        // after this point.
        debug!(
            "SyncScheduler: worker exiting ({} attempts discarded)",
            in_flight.len()
        );
    }

    fn begin_attempt(
        &mut self,
        in_flight: &mut FuturesUnordered<BoxFuture<'static, AttemptResult>>,
        trigger: &'static str,
    ) {
        if !self.visibility.is_visible() {
            debug!(
                "SyncScheduler: hidden, skipping {} refresh (next in {}ms)",
                trigger,
                self.backoff.current_ms()
            );
            self.arm_timer();
            return;
        }

        // The resolution of this attempt arms the next timer.
        self.deadline = None;

        let attempt_id = self.next_attempt_id;
        self.next_attempt_id += 1;
        self.latest_issued = Some(attempt_id);

        self.state_tx.send_if_modified(|state| {
            if state.status == SyncStatus::Loading {
                false
            } else {
                state.status = SyncStatus::Loading;
                true
            }
        });

        debug!("SyncScheduler: attempt #{} ({})", attempt_id, trigger);
        let fetcher = Arc::clone(&self.fetcher);
        in_flight.push(Box::pin(async move { (attempt_id, fetcher.fetch().await) }));
    }

    fn resolve(
        &mut self,
        attempt_id: u64,
        result: std::result::Result<Vec<ValueBetRecord>, TransportError>,
    ) {
        if self.config.response_ordering == ResponseOrdering::LatestIssued
            && self.latest_issued.is_some_and(|latest| attempt_id < latest)
        {
            debug!(
                "SyncScheduler: discarding attempt #{} (superseded)",
                attempt_id
            );
            return;
        }

        match result {
            Ok(records) => {
                self.backoff.reset();
                let (annotated, summary) = {
                    let previous = self.state_tx.borrow();
                    reconcile_with_summary(&previous, records, self.config.edge_change_threshold)
                };
                let backoff_ms = self.backoff.current_ms();
                let total = annotated.len();
                self.state_tx.send_modify(|state| {
                    state.status = SyncStatus::Ok;
                    state.records = annotated;
                    state.last_updated_at = Some(Utc::now());
                    state.last_error = None;
                    state.current_backoff_ms = backoff_ms;
                    state.consecutive_failures = 0;
                });
                info!(
                    "SyncScheduler: refreshed {} value bets ({})",
                    total, summary
                );
            }
            Err(e) => {
                let backoff_ms = self.backoff.grow();
                let message = e.to_string();
                let mut failures = 0;
                self.state_tx.send_modify(|state| {
                    state.status = SyncStatus::Error;
                    state.last_error = Some(message);
                    state.current_backoff_ms = backoff_ms;
                    state.consecutive_failures += 1;
                    failures = state.consecutive_failures;
                });
                warn!(
                    "SyncScheduler: refresh failure #{}: {} (retry in {}ms)",
                    failures, e, backoff_ms
                );
            }
        }

        self.arm_timer();
    }

    /// Replace any outstanding timer with one at the current backoff
    fn arm_timer(&mut self) {
        self.deadline = Some(Instant::now() + self.backoff.current());
    }

    fn reset_backoff(&mut self) {
        self.backoff.reset();
        let base = self.backoff.current_ms();
        self.state_tx.send_if_modified(|state| {
            if state.current_backoff_ms == base {
                false
            } else {
                state.current_backoff_ms = base;
                true
            }
        });
    }
}
