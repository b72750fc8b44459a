// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Application-facing sync context.
//!
//! A [`SyncContext`] owns one store, monitor, engine and writer and exposes
//! the handful of calls UI code needs. Create one per process (or per test)
//! and share it by reference or `Arc`.

use std::sync::Arc;

use haven_core::{DurableStore, MemoryStore, RecordType, SqliteStore};
use serde_json::Value;
use tokio::sync::watch;

use crate::config::{Config, SyncSettings};
use crate::engine::{SyncEngine, SyncOutcome, SyncStatus};
use crate::error::Result;
use crate::facade::OfflineWriter;
use crate::network::NetworkMonitor;
use crate::probe::TcpProbe;
use crate::remote::{HttpRemote, RemoteApi};

/// Wired-up offline sync layer.
pub struct SyncContext {
    engine: Arc<SyncEngine>,
    writer: OfflineWriter,
    /// Set by [`SyncContext::open`]; the probe task runs as long as the context.
    probe: Option<Arc<TcpProbe>>,
}

impl SyncContext {
    /// Opens the SQLite store at the configured path, connects the HTTP
    /// remote and starts the TCP connectivity probe.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(SqliteStore::new(config.store_path()));
        let remote = Arc::new(HttpRemote::from_config(&config.remote)?);
        let probe = TcpProbe::from_config(config).await?;
        let monitor = NetworkMonitor::new(probe.clone());

        let mut context = Self::with_parts(store, remote, monitor, config.sync.clone()).await?;
        context.probe = Some(probe);
        Ok(context)
    }

    /// Builds a context from injected parts.
    ///
    /// A store that reports no persistent storage is replaced by a
    /// [`MemoryStore`]; queued writes then last only as long as the process.
    pub async fn with_parts(
        store: Arc<dyn DurableStore>,
        remote: Arc<dyn RemoteApi>,
        monitor: NetworkMonitor,
        settings: SyncSettings,
    ) -> Result<Self> {
        let store = open_store(store)?;
        let engine = SyncEngine::new(store, remote, monitor, settings);
        engine.initialize().await?;

        Ok(SyncContext {
            writer: OfflineWriter::new(engine.clone()),
            engine,
            probe: None,
        })
    }

    pub fn is_online(&self) -> bool {
        self.engine.monitor().is_online()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.engine.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.engine.watch_status()
    }

    /// Queues a write without trying the remote first.
    pub fn save_offline(&self, record_type: RecordType, payload: Value) -> Result<String> {
        self.engine.save_offline(record_type, payload)
    }

    /// Runs a sync pass now.
    pub async fn trigger_sync(&self) -> Result<SyncOutcome> {
        self.engine.sync_data().await
    }

    pub fn writer(&self) -> &OfflineWriter {
        &self.writer
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// False when running on the in-memory fallback store.
    pub fn is_durable(&self) -> bool {
        self.engine.is_durable()
    }

    /// Connectivity probe started by [`SyncContext::open`].
    pub fn probe(&self) -> Option<&Arc<TcpProbe>> {
        self.probe.as_ref()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn open_store(store: Arc<dyn DurableStore>) -> Result<Arc<dyn DurableStore>> {
    match store.initialize() {
        Ok(()) => Ok(store),
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, "persistent storage unavailable, queueing in memory");
            let fallback = MemoryStore::new();
            fallback.initialize()?;
            Ok(Arc::new(fallback))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
