// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for haven-core storage operations.

use thiserror::Error;

/// All possible errors that can occur in haven-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Persistent storage could not be opened at all.
    ///
    /// Callers treat this as non-fatal and fall back to a non-durable store.
    #[error("persistent storage unavailable: {0}\n  hint: pending writes will not survive a restart")]
    StorageUnavailable(String),

    #[error("store not initialized: call initialize() first")]
    NotInitialized,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("invalid record type: '{0}'\n  hint: valid types are: journal, mood, aura, message, friend_request, group_activity")]
    InvalidRecordType(String),
}

impl Error {
    /// Returns true if the error means no persistent storage exists at all,
    /// as opposed to a single failed read or write.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}

/// A specialized Result type for haven-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
