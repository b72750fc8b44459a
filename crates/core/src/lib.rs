// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haven-core: durable pending-write storage for the haven offline sync layer.
//!
//! This crate provides the record model, id generation, and the
//! [`DurableStore`] implementations used by the sync engine in `haven-sync`.
//!
//! # Main Components
//!
//! - [`PendingRecord`] / [`RecordType`] - the unit of queued work and its domain tag
//! - [`DurableStore`] - storage interface for pending records
//! - [`SqliteStore`] - SQLite-backed store that survives restarts
//! - [`MemoryStore`] - non-durable fallback and test fake

pub mod clock;
pub mod db;
pub mod error;
pub mod id;
pub mod memory;
pub mod record;
pub mod store;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use db::SqliteStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use record::{PendingRecord, RecordType};
pub use store::DurableStore;
