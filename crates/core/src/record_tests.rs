// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    journal = { RecordType::Journal, "/api/journals" },
    mood = { RecordType::Mood, "/api/mood" },
    aura = { RecordType::Aura, "/api/aura" },
    message = { RecordType::Message, "/api/messages" },
    friend_request = { RecordType::FriendRequest, "/api/friends/request" },
    group_activity = { RecordType::GroupActivity, "/api/groups/activity" },
)]
fn endpoint_per_type(record_type: RecordType, expected: &str) {
    assert_eq!(record_type.endpoint(), expected);
}

#[test]
fn display_and_parse_agree_for_all_types() {
    for record_type in RecordType::ALL {
        let parsed: RecordType = record_type.to_string().parse().unwrap();
        assert_eq!(parsed, record_type);
    }
}

#[parameterized(
    upper = { "MOOD", RecordType::Mood },
    dashed = { "friend-request", RecordType::FriendRequest },
    mixed = { "Group_Activity", RecordType::GroupActivity },
)]
fn parse_is_lenient(input: &str, expected: RecordType) {
    assert_eq!(input.parse::<RecordType>().unwrap(), expected);
}

#[test]
fn parse_rejects_unknown_type() {
    let err = "poem".parse::<RecordType>().unwrap_err();
    assert!(matches!(err, Error::InvalidRecordType(ref s) if s == "poem"));
}

#[test]
fn serde_uses_snake_case_tags() {
    let json = serde_json::to_string(&RecordType::FriendRequest).unwrap();
    assert_eq!(json, "\"friend_request\"");
}

#[test]
fn new_record_starts_unsynced() {
    let record = PendingRecord::new(
        "mood_1_abcd".into(),
        RecordType::Mood,
        json!({"value": 7}),
        1,
    );
    assert!(!record.synced);
    assert_eq!(record.payload["value"], 7);
}
