// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine.
//!
//! Replays unsynced pending records against the remote API whenever the
//! client comes back online. A pass:
//! 1. reads every unsynced record, oldest first
//! 2. posts each one to its endpoint, one at a time, marking successes synced
//!    and leaving failures for a later pass
//! 3. deletes the records that are now synced
//!
//! At most one pass runs at a time. A trigger that arrives mid-pass is
//! dropped; the next trigger picks up whatever is left.
//!
//! A record is marked synced only after the remote confirms it, so a crash in
//! between replays it again. Endpoints must tolerate duplicate delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use haven_core::{DurableStore, PendingRecord, RecordType};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::network::{NetworkMonitor, Subscription};
use crate::remote::RemoteApi;

/// Whether a pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
}

/// Counts from one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Unsynced records found at the start of the pass.
    pub attempted: usize,
    /// Records confirmed by the remote and marked synced.
    pub synced: usize,
    /// Records left unsynced for a later pass.
    pub failed: usize,
    /// Synced records deleted by cleanup.
    pub cleaned: usize,
}

/// Why a pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadySyncing,
}

/// Result of [`SyncEngine::sync_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Completed(SyncReport),
}

/// Observable engine status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Passes that ran to the end or aborted.
    pub passes: u64,
    pub last_report: Option<SyncReport>,
    /// Completion time of the last successful pass (ms since Unix epoch).
    pub last_sync_at_ms: Option<i64>,
    /// Error from the last pass, cleared by the next successful one.
    pub last_error: Option<String>,
}

/// Replays pending records against the remote API.
pub struct SyncEngine {
    store: Arc<dyn DurableStore>,
    remote: Arc<dyn RemoteApi>,
    monitor: NetworkMonitor,
    settings: SyncSettings,
    in_progress: AtomicBool,
    status: watch::Sender<SyncStatus>,
    subscription: Mutex<Option<Subscription>>,
    /// Stops the periodic retry task. Replaced when a shut-down engine is
    /// initialized again.
    cancel_token: Mutex<CancellationToken>,
}

/// Releases the reentrancy flag however the pass ends.
struct PassGuard<'a> {
    engine: &'a SyncEngine,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.engine.in_progress.store(false, Ordering::Release);
        self.engine.status.send_modify(|status| {
            status.state = SyncState::Idle;
            status.passes += 1;
        });
    }
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn DurableStore>,
        remote: Arc<dyn RemoteApi>,
        monitor: NetworkMonitor,
        settings: SyncSettings,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(SyncStatus::default());
        Arc::new(SyncEngine {
            store,
            remote,
            monitor,
            settings,
            in_progress: AtomicBool::new(false),
            status,
            subscription: Mutex::new(None),
            cancel_token: Mutex::new(CancellationToken::new()),
        })
    }

    /// Initializes the store, starts listening for reconnects, and runs a
    /// pass right away when already online.
    ///
    /// Must be called from within a tokio runtime. Calling it again re-runs
    /// the startup pass without registering a second listener. After
    /// [`SyncEngine::shutdown`] it restarts the listener and periodic retry.
    pub async fn initialize(self: &Arc<Self>) -> Result<()> {
        self.store.initialize()?;

        let handle = Handle::try_current()
            .map_err(|e| Error::Config(format!("sync engine needs a tokio runtime: {}", e)))?;

        let first_start = {
            let mut subscription = self
                .subscription
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if subscription.is_none() {
                *subscription = Some(self.subscribe_reconnects(handle.clone()));
                true
            } else {
                false
            }
        };

        if first_start {
            let cancel_token = {
                let mut token = self.cancel_token.lock().unwrap_or_else(|e| e.into_inner());
                if token.is_cancelled() {
                    *token = CancellationToken::new();
                }
                token.clone()
            };
            if let Some(interval) = self.settings.retry_interval() {
                self.spawn_periodic_retry(&handle, interval, cancel_token);
            }
        }

        if self.monitor.is_online() {
            self.run_triggered("startup").await;
        }
        Ok(())
    }

    fn subscribe_reconnects(self: &Arc<Self>, handle: Handle) -> Subscription {
        let weak: Weak<SyncEngine> = Arc::downgrade(self);
        self.monitor.subscribe(move |online| {
            if !online {
                return;
            }
            let Some(engine) = weak.upgrade() else {
                return;
            };
            handle.spawn(async move {
                engine.run_triggered("reconnect").await;
            });
        })
    }

    fn spawn_periodic_retry(
        self: &Arc<Self>,
        handle: &Handle,
        interval: Duration,
        cancel_token: CancellationToken,
    ) {
        let weak: Weak<SyncEngine> = Arc::downgrade(self);
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(engine) = weak.upgrade() else {
                    break;
                };
                if engine.monitor.is_online() {
                    engine.run_triggered("retry").await;
                }
            }
        });
    }

    /// Runs a pass and logs the outcome instead of returning it.
    async fn run_triggered(&self, trigger: &str) {
        match self.sync_data().await {
            Ok(SyncOutcome::Completed(report)) => {
                if report.attempted > 0 {
                    tracing::info!(
                        trigger,
                        synced = report.synced,
                        failed = report.failed,
                        cleaned = report.cleaned,
                        "sync pass finished"
                    );
                }
            }
            Ok(SyncOutcome::Skipped(reason)) => {
                tracing::debug!(trigger, ?reason, "sync pass skipped");
            }
            Err(e) => {
                tracing::warn!(trigger, error = %e, "sync pass aborted");
            }
        }
    }

    /// Runs one sync pass.
    ///
    /// No-op when offline or when another pass is in flight. Per-record
    /// failures are logged and counted, never returned; only a failure to
    /// read the pending set aborts the pass.
    pub async fn sync_data(&self) -> Result<SyncOutcome> {
        if !self.monitor.is_online() {
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }
        let Some(_guard) = self.begin_pass() else {
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadySyncing));
        };

        let result = self.run_pass().await;
        match &result {
            Ok(report) => self.status.send_modify(|status| {
                status.last_report = Some(report.clone());
                status.last_sync_at_ms = Some(Utc::now().timestamp_millis());
                status.last_error = None;
            }),
            Err(e) => {
                let message = e.to_string();
                self.status
                    .send_modify(|status| status.last_error = Some(message));
            }
        }
        result.map(SyncOutcome::Completed)
    }

    fn begin_pass(&self) -> Option<PassGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.status
            .send_modify(|status| status.state = SyncState::Syncing);
        Some(PassGuard { engine: self })
    }

    async fn run_pass(&self) -> Result<SyncReport> {
        let records = self
            .store
            .get_unsynced()
            .map_err(|e| Error::SyncAborted(format!("cannot read pending records: {}", e)))?;

        let mut report = SyncReport {
            attempted: records.len(),
            ..SyncReport::default()
        };
        if !records.is_empty() {
            tracing::debug!(pending = records.len(), "sync pass started");
        }

        // Sequential on purpose: replay order must match enqueue order.
        for record in &records {
            if self.replay(record).await {
                report.synced += 1;
            } else {
                report.failed += 1;
            }
        }

        match self.store.clear_synced() {
            Ok(cleaned) => report.cleaned = cleaned,
            Err(e) => tracing::warn!(error = %e, "could not clean up synced records"),
        }

        Ok(report)
    }

    /// Returns true once the record is confirmed and marked synced.
    async fn replay(&self, record: &PendingRecord) -> bool {
        let endpoint = record.record_type.endpoint();
        if let Err(e) = self.remote.post(endpoint, &record.payload).await {
            tracing::warn!(
                id = %record.id,
                record_type = %record.record_type,
                error = %e,
                "replay failed, will retry"
            );
            return false;
        }

        match self.store.mark_synced(&record.id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    id = %record.id,
                    error = %e,
                    "replayed but could not mark synced, will replay again"
                );
                false
            }
        }
    }

    /// Queues a write for the next pass and returns its local id.
    pub fn save_offline(&self, record_type: RecordType, payload: Value) -> Result<String> {
        let id = self.store.save(record_type, payload)?;
        tracing::info!(id = %id, record_type = %record_type, "write queued for sync");
        Ok(id)
    }

    /// Number of records waiting for the remote API.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.store.count_unsynced()?)
    }

    /// All stored records of a type, synced or not.
    pub fn pending_by_type(&self, record_type: RecordType) -> Result<Vec<PendingRecord>> {
        Ok(self.store.get_by_type(record_type)?)
    }

    /// Drops a queued write without syncing it. Returns false if unknown.
    pub fn discard(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            tracing::info!(id = %id, "queued write discarded");
        }
        Ok(removed)
    }

    /// Current status snapshot.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn monitor(&self) -> &NetworkMonitor {
        &self.monitor
    }

    pub(crate) fn remote(&self) -> &dyn RemoteApi {
        self.remote.as_ref()
    }

    /// Whether queued writes survive a restart.
    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    /// Stops reacting to reconnects and stops periodic retries.
    ///
    /// A pass already in flight runs to completion.
    pub fn shutdown(&self) {
        self.subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.cancel_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.cancel_token
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
