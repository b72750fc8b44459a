// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed request bodies for each domain that can be written offline.
//!
//! Bodies serialize to the camelCase JSON the remote endpoints accept. Once
//! queued a body is opaque: the sync engine replays the stored JSON as-is.

use haven_core::RecordType;
use serde::{Deserialize, Serialize};

/// Ties a request body to the record type that routes it.
pub trait Domain: Serialize {
    const RECORD_TYPE: RecordType;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// Mood check-in. `value` is on a 1..=10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub value: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emotions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuraPost {
    pub content: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub recipient_id: String,
    pub content: String,
    /// Client-side send time (ms since Unix epoch); the server orders by it.
    pub sent_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub to_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Activity inside a squad/group, e.g. a check-in or a completed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupActivity {
    pub group_id: String,
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Domain for JournalEntry {
    const RECORD_TYPE: RecordType = RecordType::Journal;
}

impl Domain for MoodEntry {
    const RECORD_TYPE: RecordType = RecordType::Mood;
}

impl Domain for AuraPost {
    const RECORD_TYPE: RecordType = RecordType::Aura;
}

impl Domain for ChatMessage {
    const RECORD_TYPE: RecordType = RecordType::Message;
}

impl Domain for FriendRequest {
    const RECORD_TYPE: RecordType = RecordType::FriendRequest;
}

impl Domain for GroupActivity {
    const RECORD_TYPE: RecordType = RecordType::GroupActivity;
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
