// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use haven_core::{DurableStore, MemoryStore, PendingRecord, RecordType};
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::SyncSettings;
use crate::engine::SyncEngine;
use crate::network::{ManualConnectivity, NetworkMonitor};
use crate::remote::{RemoteApi, RemoteError, RemoteFuture};

/// Scriptable in-process [`RemoteApi`].
#[derive(Default)]
pub struct MockRemote {
    /// Every (endpoint, body) that reached the remote, in call order.
    calls: Mutex<Vec<(String, Value)>>,
    fail_all: AtomicBool,
    /// Bodies that get a 500 response.
    failing_bodies: Mutex<Vec<Value>>,
    /// Body that makes the call panic.
    panic_body: Mutex<Option<Value>>,
    response: Mutex<Value>,
    /// When set, calls wait here before answering.
    gate: Mutex<Option<Arc<Notify>>>,
    entered: Notify,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(MockRemote::default())
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_body(&self, body: Value) {
        self.failing_bodies.lock().unwrap().push(body);
    }

    pub fn clear_failures(&self) {
        self.failing_bodies.lock().unwrap().clear();
        *self.panic_body.lock().unwrap() = None;
        self.set_fail_all(false);
    }

    pub fn panic_on(&self, body: Value) {
        *self.panic_body.lock().unwrap() = Some(body);
    }

    pub fn respond_with(&self, body: Value) {
        *self.response.lock().unwrap() = body;
    }

    /// Holds every call until `gate` is notified.
    pub fn hold(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    /// Resolves once a call has entered the remote.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }
}

impl RemoteApi for MockRemote {
    fn post<'a>(&'a self, endpoint: &'a str, body: &'a Value) -> RemoteFuture<'a> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            self.entered.notify_one();

            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            if self.panic_body.lock().unwrap().as_ref() == Some(body) {
                panic!("mock remote panicked on {body}");
            }

            let failing = self.fail_all.load(Ordering::SeqCst)
                || self.failing_bodies.lock().unwrap().contains(body);
            if failing {
                return Err(RemoteError::Status {
                    endpoint: endpoint.to_string(),
                    status: 500,
                });
            }
            Ok(self.response.lock().unwrap().clone())
        })
    }
}

/// [`MemoryStore`] wrapper with switchable failures.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_saves: AtomicBool,
    pub fail_marks: AtomicBool,
    pub fail_clears: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        let store = FlakyStore::default();
        store.inner.initialize().unwrap();
        Arc::new(store)
    }

    fn check(flag: &AtomicBool, what: &str) -> haven_core::Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(haven_core::Error::CorruptedData(format!("{what} failed")));
        }
        Ok(())
    }
}

impl DurableStore for FlakyStore {
    fn initialize(&self) -> haven_core::Result<()> {
        self.inner.initialize()
    }

    fn save(&self, record_type: RecordType, payload: Value) -> haven_core::Result<String> {
        Self::check(&self.fail_saves, "save")?;
        self.inner.save(record_type, payload)
    }

    fn get_unsynced(&self) -> haven_core::Result<Vec<PendingRecord>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get_unsynced()
    }

    fn mark_synced(&self, id: &str) -> haven_core::Result<()> {
        Self::check(&self.fail_marks, "mark")?;
        self.inner.mark_synced(id)
    }

    fn clear_synced(&self) -> haven_core::Result<usize> {
        Self::check(&self.fail_clears, "clear")?;
        self.inner.clear_synced()
    }

    fn get_by_type(&self, record_type: RecordType) -> haven_core::Result<Vec<PendingRecord>> {
        self.inner.get_by_type(record_type)
    }

    fn delete(&self, id: &str) -> haven_core::Result<bool> {
        self.inner.delete(id)
    }

    fn is_durable(&self) -> bool {
        false
    }
}

/// Store that never opens.
pub struct UnavailableStore;

impl DurableStore for UnavailableStore {
    fn initialize(&self) -> haven_core::Result<()> {
        Err(haven_core::Error::StorageUnavailable(
            "private browsing".into(),
        ))
    }

    fn save(&self, _: RecordType, _: Value) -> haven_core::Result<String> {
        Err(haven_core::Error::NotInitialized)
    }

    fn get_unsynced(&self) -> haven_core::Result<Vec<PendingRecord>> {
        Err(haven_core::Error::NotInitialized)
    }

    fn mark_synced(&self, _: &str) -> haven_core::Result<()> {
        Err(haven_core::Error::NotInitialized)
    }

    fn clear_synced(&self) -> haven_core::Result<usize> {
        Err(haven_core::Error::NotInitialized)
    }

    fn get_by_type(&self, _: RecordType) -> haven_core::Result<Vec<PendingRecord>> {
        Err(haven_core::Error::NotInitialized)
    }

    fn delete(&self, _: &str) -> haven_core::Result<bool> {
        Err(haven_core::Error::NotInitialized)
    }
}

/// Engine wired to a memory store, a mock remote and a manual connectivity
/// source. Not initialized.
pub struct TestRig {
    pub store: Arc<FlakyStore>,
    pub remote: Arc<MockRemote>,
    pub connectivity: Arc<ManualConnectivity>,
    pub engine: Arc<SyncEngine>,
}

impl TestRig {
    pub fn new(online: bool) -> Self {
        Self::with_settings(online, SyncSettings::default())
    }

    pub fn with_settings(online: bool, settings: SyncSettings) -> Self {
        let store = FlakyStore::new();
        let remote = MockRemote::new();
        let connectivity = ManualConnectivity::new(online);
        let monitor = NetworkMonitor::new(connectivity.clone());
        let engine = SyncEngine::new(store.clone(), remote.clone(), monitor, settings);
        TestRig {
            store,
            remote,
            connectivity,
            engine,
        }
    }

    /// Waits until the engine has finished `passes` passes in total.
    pub async fn wait_for_passes(&self, passes: u64) {
        let mut rx = self.engine.watch_status();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            rx.wait_for(|status| status.passes >= passes),
        )
        .await
        .expect("timed out waiting for sync pass")
        .expect("status channel closed");
    }
}
