// src/models/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One participant's completed scoring record for a room.
/// Immutable after creation; a participant may hold several per room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: Uuid,

    /// Denormalized reference to the owning room, kept for leaderboard
    /// queries scoped by code rather than id.
    pub room_code: String,

    pub user_id: String,
    pub user_name: String,

    /// Count of correct answers, `0 ..= question count`.
    pub score: u32,

    /// Seconds from session start to submission, clamped to the allotted time.
    pub time_taken: u64,

    pub submitted_at: DateTime<Utc>,
}

/// One row of the ranked leaderboard for a room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position after sorting by (score desc, timeTaken asc).
    pub rank: usize,
    pub user_id: String,
    pub user_name: String,
    pub score: u32,
    pub time_taken: u64,
    pub submitted_at: DateTime<Utc>,
}

/// DTO for the bulk-submission path: all answers at once, keyed by question
/// index.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_name: String,
    pub answers: HashMap<usize, String>,
}

/// DTO returned once a session has been scored and recorded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReceipt {
    pub attempt_id: Uuid,
    pub room_code: String,
    pub score: u32,
    pub time_taken: u64,
}
