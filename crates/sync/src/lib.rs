// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haven-sync: offline-first write path for the haven wellness client.
//!
//! Writes go straight to the remote API while the client is online. When it
//! is offline, or a write fails, the body is queued in a
//! [`DurableStore`](haven_core::DurableStore) and replayed in order by the
//! [`SyncEngine`] once connectivity returns.
//!
//! # Main Components
//!
//! - [`NetworkMonitor`] - cached online/offline state with transition fan-out
//! - [`TcpProbe`] / [`ManualConnectivity`] - connectivity sources
//! - [`RemoteApi`] / [`HttpRemote`] - the write target
//! - [`SyncEngine`] - replays pending records, one pass at a time
//! - [`OfflineWriter`] - try-online-else-queue writes for every domain
//! - [`SyncContext`] - everything above wired together from a [`Config`]

pub mod config;
pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod facade;
pub mod network;
pub mod probe;
pub mod remote;

#[cfg(test)]
mod test_helpers;

pub use config::Config;
pub use context::SyncContext;
pub use domain::{
    AuraPost, ChatMessage, Domain, FriendRequest, GroupActivity, JournalEntry, MoodEntry,
};
pub use engine::{SkipReason, SyncEngine, SyncOutcome, SyncReport, SyncState, SyncStatus};
pub use error::{Error, Result};
pub use facade::{OfflineWriter, WriteOutcome};
pub use network::{ConnectivitySource, ManualConnectivity, NetworkMonitor, Subscription};
pub use probe::TcpProbe;
pub use remote::{HttpRemote, RemoteApi, RemoteError};

pub use haven_core::{DurableStore, MemoryStore, PendingRecord, RecordType, SqliteStore};
