// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, models::attempt::SubmitAttemptRequest, session::SessionManager};

/// Submits a participant's answers for a room in one shot.
///
/// This finalizes the caller's open session there (manual-submit path of the
/// runner): the answer map is merged over anything already answered, scored
/// once, and recorded as one immutable attempt. Without an open session there
/// is nothing to submit and the call misses.
pub async fn submit_attempt(
    State(sessions): State<SessionManager>,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let receipt = sessions
        .submit(room_id, &payload.user_id, payload.answers)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
