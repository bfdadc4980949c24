// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{AnswerRequest, StartSessionRequest},
    session::{AnswerOutcome, SessionManager},
    store::RoomStore,
};

/// Starts a timed session for a participant in a room.
///
/// Returns the question sequence without correct answers and arms the
/// countdown; when it reaches zero the session submits itself with whatever
/// has been answered.
pub async fn start_session(
    State(store): State<RoomStore>,
    State(sessions): State<SessionManager>,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let room = store
        .get_room(room_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No room {}", room_id)))?;

    let started = sessions
        .start(&room, payload.user_id, payload.user_name)
        .await;

    Ok((StatusCode::CREATED, Json(started)))
}

/// Records the answer for the session's current question.
///
/// Answering the last question submits the session and returns the receipt.
pub async fn answer(
    State(sessions): State<SessionManager>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    match sessions.answer(session_id, payload.answer).await? {
        AnswerOutcome::InProgress {
            next_index,
            answered,
            total,
        } => Ok(Json(serde_json::json!({
            "status": "IN_PROGRESS",
            "nextIndex": next_index,
            "answered": answered,
            "total": total,
        }))),
        AnswerOutcome::Submitted(receipt) => Ok(Json(serde_json::json!({
            "status": "SUBMITTED",
            "attemptId": receipt.attempt_id,
            "roomCode": receipt.room_code,
            "score": receipt.score,
            "timeTaken": receipt.time_taken,
        }))),
    }
}

/// Abandons an in-progress session. Nothing is recorded.
pub async fn abandon_session(
    State(sessions): State<SessionManager>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sessions.abandon(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
