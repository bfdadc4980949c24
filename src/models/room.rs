// src/models/room.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Question;

/// Room lifecycle flag. Creation only ever writes `Active`; `Closed` exists so
/// records closed out-of-band are representable and filtered from discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "CLOSED")]
    Closed,
}

/// One scheduled quiz instance: a fixed question snapshot plus a join window.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,

    /// Short human-enterable code, unique among rooms (case-insensitive).
    pub room_code: String,

    /// Identity of the creator. Display-only after creation.
    pub leader_id: String,
    pub leader_name: String,

    /// Question-pool key this room was sampled from.
    pub topic: String,

    /// Immutable snapshot taken at creation. Later changes to the underlying
    /// pool must not affect this room.
    pub questions: Vec<Question>,

    /// Minutes allotted per attempt.
    pub duration: u32,

    /// Join window. Optional on the stored record: a room missing either
    /// timestamp is treated as currently joinable.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Whether the room accepts new participants at `now`.
    pub fn is_joinable(&self, now: DateTime<Utc>) -> bool {
        if self.status != RoomStatus::Active {
            return false;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= now && now <= end,
            // Fallback if timestamps are not settled yet.
            _ => true,
        }
    }
}

/// DTO for returning a room to clients. Excludes the question snapshot so the
/// correct answers never leave the server outside a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: Uuid,
    pub room_code: String,
    pub leader_name: String,
    pub topic: String,
    pub question_count: usize,
    pub duration: u32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            room_code: room.room_code.clone(),
            leader_name: room.leader_name.clone(),
            topic: room.topic.clone(),
            question_count: room.questions.len(),
            duration: room.duration,
            start_time: room.start_time,
            end_time: room.end_time,
            status: room.status,
            created_at: room.created_at,
        }
    }
}

/// DTO for creating a new room.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 128))]
    pub leader_id: String,
    #[validate(length(min = 1, max = 128))]
    pub leader_name: String,
    #[validate(length(min = 1, max = 64))]
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Minutes. Checked against the window/duration rules in the handler.
    pub duration: i64,
}

/// Query string for `GET /rooms`.
#[derive(Debug, Deserialize)]
pub struct ListRoomsQuery {
    pub joinable: Option<bool>,
}
