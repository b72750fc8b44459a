// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync context.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::engine::SkipReason;
use crate::error::Error;
use crate::network::ManualConnectivity;
use crate::test_helpers::{MockRemote, UnavailableStore};
use serde_json::json;
use tempfile::TempDir;

async fn sqlite_context(
    dir: &TempDir,
    online: bool,
) -> (SyncContext, Arc<MockRemote>, Arc<ManualConnectivity>) {
    let connectivity = ManualConnectivity::new(online);
    let remote = MockRemote::new();
    let context = SyncContext::with_parts(
        Arc::new(SqliteStore::new(dir.path().join("pending.db"))),
        remote.clone(),
        NetworkMonitor::new(connectivity.clone()),
        SyncSettings::default(),
    )
    .await
    .unwrap();
    (context, remote, connectivity)
}

#[tokio::test]
async fn unavailable_storage_degrades_to_memory() {
    let context = SyncContext::with_parts(
        Arc::new(UnavailableStore),
        MockRemote::new(),
        NetworkMonitor::new(ManualConnectivity::new(false)),
        SyncSettings::default(),
    )
    .await
    .unwrap();

    assert!(!context.is_durable());
    let id = context
        .save_offline(RecordType::Mood, json!({"value": 5}))
        .unwrap();
    assert!(id.starts_with("mood_"));
    assert_eq!(context.engine().pending_count().unwrap(), 1);
}

#[tokio::test]
async fn hook_surface_reflects_engine() {
    let dir = TempDir::new().unwrap();
    let (context, remote, connectivity) = sqlite_context(&dir, false).await;

    assert!(context.is_durable());
    assert!(!context.is_online());
    assert!(context.probe().is_none());

    context
        .save_offline(RecordType::Journal, json!({"title": "draft"}))
        .unwrap();
    assert_eq!(
        context.trigger_sync().await.unwrap(),
        SyncOutcome::Skipped(SkipReason::Offline)
    );

    let mut status = context.watch_status();
    connectivity.set_online(true);
    assert!(context.is_online());
    status.wait_for(|s| s.passes >= 1).await.unwrap();

    assert_eq!(remote.call_count(), 1);
    let report = context.sync_status().last_report.unwrap();
    assert_eq!(report.synced, 1);
}

#[tokio::test]
async fn queued_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (context, _remote, _connectivity) = sqlite_context(&dir, false).await;
        let outcome = context
            .writer()
            .write_raw(RecordType::Message, json!({"content": "later"}))
            .await
            .unwrap();
        assert!(outcome.is_offline());
        context.shutdown();
    }

    // Reopening online replays the leftover record during startup
    let (context, remote, _connectivity) = sqlite_context(&dir, true).await;
    assert_eq!(
        remote.calls(),
        vec![("/api/messages".to_string(), json!({"content": "later"}))]
    );
    assert_eq!(context.engine().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn open_rejects_invalid_config() {
    let mut config = Config::default();
    config.remote.request_timeout_secs = 0;

    let err = SyncContext::open(&config).await.err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn open_wires_sqlite_and_probe() {
    let dir = TempDir::new().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config::from_toml(&format!(
        r#"
[remote]
base_url = "http://{addr}"

[store]
path = "{}"

[connectivity]
probe_interval_ms = 50
"#,
        dir.path().join("pending.db").display()
    ))
    .unwrap();

    let context = SyncContext::open(&config).await.unwrap();

    assert!(context.is_durable());
    assert_eq!(context.probe().unwrap().addr(), addr.to_string());
    assert!(dir.path().join("pending.db").exists());
    context.shutdown();
}
