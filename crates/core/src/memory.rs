// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory pending record store.
//!
//! Same semantics as [`SqliteStore`](crate::SqliteStore) without durability.
//! Used as the fallback when persistent storage is unavailable, and as a fake
//! in tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::record::{PendingRecord, RecordType};
use crate::store::DurableStore;

#[derive(Default)]
struct MemoryState {
    initialized: bool,
    /// Insertion order.
    records: Vec<PendingRecord>,
}

/// Non-durable pending record store.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn ClockSource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState::default()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for `created_at_ms`.
    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut Vec<PendingRecord>) -> T) -> Result<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.initialized {
            return Err(Error::NotInitialized);
        }
        Ok(f(&mut state.records))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for MemoryStore {
    fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.initialized = true;
        Ok(())
    }

    fn save(&self, record_type: RecordType, payload: Value) -> Result<String> {
        let created_at_ms = self.clock.now_ms();
        self.with_state(|records| {
            let id = generate_unique_id(record_type, created_at_ms, |candidate| {
                records.iter().any(|r| r.id == candidate)
            });
            records.push(PendingRecord::new(
                id.clone(),
                record_type,
                payload,
                created_at_ms,
            ));
            id
        })
    }

    fn get_unsynced(&self) -> Result<Vec<PendingRecord>> {
        self.with_state(|records| records.iter().filter(|r| !r.synced).cloned().collect())
    }

    fn mark_synced(&self, id: &str) -> Result<()> {
        self.with_state(|records| {
            if let Some(record) = records.iter_mut().find(|r| r.id == id) {
                record.synced = true;
            }
        })
    }

    fn clear_synced(&self) -> Result<usize> {
        self.with_state(|records| {
            let before = records.len();
            records.retain(|r| !r.synced);
            before - records.len()
        })
    }

    fn get_by_type(&self, record_type: RecordType) -> Result<Vec<PendingRecord>> {
        self.with_state(|records| {
            records
                .iter()
                .filter(|r| r.record_type == record_type)
                .cloned()
                .collect()
        })
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.with_state(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            records.len() < before
        })
    }

    fn is_durable(&self) -> bool {
        false
    }
}
