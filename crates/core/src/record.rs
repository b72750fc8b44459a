// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending record types.
//!
//! A [`PendingRecord`] is a write that could not be confirmed by the remote
//! API yet. Its [`RecordType`] decides which endpoint replays it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Domain tag of a pending write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Journal entry.
    Journal,
    /// Mood check-in.
    Mood,
    /// Aura post on the social feed.
    Aura,
    /// Chat message.
    Message,
    /// Friend request to another user.
    FriendRequest,
    /// Activity inside a squad/group.
    GroupActivity,
}

impl RecordType {
    /// Every record type, in declaration order.
    pub const ALL: [RecordType; 6] = [
        RecordType::Journal,
        RecordType::Mood,
        RecordType::Aura,
        RecordType::Message,
        RecordType::FriendRequest,
        RecordType::GroupActivity,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Journal => "journal",
            RecordType::Mood => "mood",
            RecordType::Aura => "aura",
            RecordType::Message => "message",
            RecordType::FriendRequest => "friend_request",
            RecordType::GroupActivity => "group_activity",
        }
    }

    /// Remote endpoint that accepts this record's payload as a JSON POST body.
    pub fn endpoint(&self) -> &'static str {
        match self {
            RecordType::Journal => "/api/journals",
            RecordType::Mood => "/api/mood",
            RecordType::Aura => "/api/aura",
            RecordType::Message => "/api/messages",
            RecordType::FriendRequest => "/api/friends/request",
            RecordType::GroupActivity => "/api/groups/activity",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "journal" => Ok(RecordType::Journal),
            "mood" => Ok(RecordType::Mood),
            "aura" => Ok(RecordType::Aura),
            "message" => Ok(RecordType::Message),
            "friend_request" => Ok(RecordType::FriendRequest),
            "group_activity" => Ok(RecordType::GroupActivity),
            _ => Err(Error::InvalidRecordType(s.to_string())),
        }
    }
}

/// A write waiting for confirmation by the remote API.
///
/// After creation only `synced` ever changes, and only from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Unique id, also the store's primary key.
    pub id: String,
    /// Domain tag selecting the replay endpoint.
    pub record_type: RecordType,
    /// Opaque request body, forwarded as-is on replay.
    pub payload: serde_json::Value,
    /// Enqueue time in milliseconds since Unix epoch.
    pub created_at_ms: i64,
    /// Set once the remote API has confirmed the write.
    pub synced: bool,
}

impl PendingRecord {
    /// Creates a new unsynced record.
    pub fn new(
        id: String,
        record_type: RecordType,
        payload: serde_json::Value,
        created_at_ms: i64,
    ) -> Self {
        PendingRecord {
            id,
            record_type,
            payload,
            created_at_ms,
            synced: false,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
