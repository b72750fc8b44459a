// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage interface for pending records.
//!
//! Implementations must keep two guarantees:
//! - unsynced records are returned oldest first, in insertion order
//! - a record is never removed by [`DurableStore::clear_synced`] while `synced == false`

use serde_json::Value;

use crate::error::Result;
use crate::record::{PendingRecord, RecordType};

/// Keyed store of pending writes.
///
/// Methods are synchronous: each call is one short statement against local
/// storage, so async callers invoke them directly.
pub trait DurableStore: Send + Sync {
    /// Opens the backing storage and applies the schema.
    ///
    /// Idempotent. Fails with [`Error::StorageUnavailable`](crate::Error::StorageUnavailable)
    /// when no persistent storage can be opened.
    fn initialize(&self) -> Result<()>;

    /// Persists a new unsynced record and returns its id.
    fn save(&self, record_type: RecordType, payload: Value) -> Result<String>;

    /// Returns all unsynced records, oldest first.
    fn get_unsynced(&self) -> Result<Vec<PendingRecord>>;

    /// Marks a record synced. Unknown or already-synced ids are a no-op.
    fn mark_synced(&self, id: &str) -> Result<()>;

    /// Deletes every synced record and returns how many were removed.
    fn clear_synced(&self) -> Result<usize>;

    /// Returns all records of a type, synced or not, oldest first.
    fn get_by_type(&self, record_type: RecordType) -> Result<Vec<PendingRecord>>;

    /// Removes a record unconditionally. Returns false if it did not exist.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Number of records still waiting for the remote API.
    fn count_unsynced(&self) -> Result<usize> {
        Ok(self.get_unsynced()?.len())
    }

    /// Whether records survive a process restart.
    fn is_durable(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
