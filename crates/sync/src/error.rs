// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use haven_core::RecordType;
use thiserror::Error;

use crate::remote::RemoteError;

/// All possible errors that can occur in the haven-sync library.
///
/// Storage and remote failures inside a sync pass are absorbed and retried;
/// these variants reach callers only when nothing else can be done.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] haven_core::Error),

    #[error("remote write failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("sync pass aborted: {0}")]
    SyncAborted(String),

    #[error("could not save {record_type} entry online or offline: {source}\n  hint: keep the app open and try again once storage is available")]
    SaveFailed {
        record_type: RecordType,
        source: haven_core::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for haven-sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
