// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-aware writes.
//!
//! [`OfflineWriter`] gives every domain the same write path: post to the
//! remote API while online, queue the body for the sync engine otherwise or
//! when the post fails. Only a failure to queue reaches the caller.

use std::sync::Arc;

use haven_core::RecordType;
use serde_json::Value;

use crate::domain::{
    AuraPost, ChatMessage, Domain, FriendRequest, GroupActivity, JournalEntry, MoodEntry,
};
use crate::engine::SyncEngine;
use crate::error::{Error, Result};

/// Where a write ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Confirmed by the remote API.
    Remote {
        /// Server-assigned id, when the response carried one.
        id: Option<String>,
        body: Value,
    },
    /// Queued locally; the sync engine delivers it later.
    Queued { id: String },
}

impl WriteOutcome {
    pub fn id(&self) -> Option<&str> {
        match self {
            WriteOutcome::Remote { id, .. } => id.as_deref(),
            WriteOutcome::Queued { id } => Some(id),
        }
    }

    /// True when the write is waiting in the local queue.
    pub fn is_offline(&self) -> bool {
        matches!(self, WriteOutcome::Queued { .. })
    }
}

/// Try-online-else-queue writer shared by all domains.
#[derive(Clone)]
pub struct OfflineWriter {
    engine: Arc<SyncEngine>,
}

impl OfflineWriter {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        OfflineWriter { engine }
    }

    /// Writes a typed body to its domain's endpoint.
    pub async fn write<D: Domain>(&self, payload: &D) -> Result<WriteOutcome> {
        let body = serde_json::to_value(payload)?;
        self.write_raw(D::RECORD_TYPE, body).await
    }

    /// Writes an untyped body for `record_type`.
    pub async fn write_raw(&self, record_type: RecordType, body: Value) -> Result<WriteOutcome> {
        if self.engine.monitor().is_online() {
            match self.engine.remote().post(record_type.endpoint(), &body).await {
                Ok(response) => {
                    return Ok(WriteOutcome::Remote {
                        id: response_id(&response),
                        body: response,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        record_type = %record_type,
                        error = %e,
                        "online write failed, queueing"
                    );
                }
            }
        }

        match self.engine.save_offline(record_type, body) {
            Ok(id) => Ok(WriteOutcome::Queued { id }),
            Err(Error::Store(source)) => {
                tracing::error!(
                    record_type = %record_type,
                    error = %source,
                    "write lost: could not queue"
                );
                Err(Error::SaveFailed {
                    record_type,
                    source,
                })
            }
            Err(other) => Err(other),
        }
    }

    pub async fn save_journal_entry(&self, entry: &JournalEntry) -> Result<WriteOutcome> {
        self.write(entry).await
    }

    pub async fn save_mood_entry(&self, entry: &MoodEntry) -> Result<WriteOutcome> {
        self.write(entry).await
    }

    pub async fn create_aura_post(&self, post: &AuraPost) -> Result<WriteOutcome> {
        self.write(post).await
    }

    pub async fn send_message(&self, message: &ChatMessage) -> Result<WriteOutcome> {
        self.write(message).await
    }

    pub async fn send_friend_request(&self, request: &FriendRequest) -> Result<WriteOutcome> {
        self.write(request).await
    }

    pub async fn log_group_activity(&self, activity: &GroupActivity) -> Result<WriteOutcome> {
        self.write(activity).await
    }
}

/// Reads the `id` field of a response body, accepting strings and numbers.
fn response_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
