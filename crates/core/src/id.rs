// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending record id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::record::RecordType;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a record id from its type and enqueue time.
/// Format: {type}_{created_at_ms}_{suffix} where suffix is 8 hex chars of
/// SHA256(type + timestamp + process sequence + sub-ms clock).
pub fn generate_id(record_type: RecordType, created_at_ms: i64) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nanos = Utc::now().timestamp_subsec_nanos();
    let input = format!(
        "{}{}{}{}{}",
        record_type,
        created_at_ms,
        seq,
        nanos,
        std::process::id()
    );
    let hash = Sha256::digest(input.as_bytes());
    let suffix = hex::encode(&hash[..4]);
    format!("{}_{}_{}", record_type, created_at_ms, suffix)
}

/// Generate an id that does not exist yet, appending an incrementing
/// suffix on collision.
pub fn generate_unique_id<F>(record_type: RecordType, created_at_ms: i64, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(record_type, created_at_ms);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
