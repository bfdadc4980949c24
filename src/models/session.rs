// src/models/session.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::PublicQuestion;

/// DTO for entering a room and starting the countdown.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_name: String,
}

/// DTO returned when a session starts: everything a participant needs to
/// play, minus the correct answers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStarted {
    pub session_id: Uuid,
    pub room_code: String,
    pub questions: Vec<PublicQuestion>,
    /// Countdown length in seconds.
    pub expires_in: u64,
}

/// DTO for answering the current question of a session.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}
