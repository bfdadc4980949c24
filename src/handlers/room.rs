// src/handlers/room.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    bank::QuestionBank,
    config::ROOM_QUESTION_COUNT,
    error::AppError,
    models::room::{CreateRoomRequest, ListRoomsQuery, RoomSummary},
    store::{NewRoom, RoomStore},
};

/// Creates a quiz room.
///
/// * Validates the time window, duration and topic before any write.
/// * Samples exactly 10 questions without replacement from the topic pool.
/// * Allocates a unique room code; nothing is persisted if any step fails.
pub async fn create_room(
    State(store): State<RoomStore>,
    State(bank): State<Arc<QuestionBank>>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.start_time >= payload.end_time {
        return Err(AppError::InvalidTimeWindow);
    }
    if payload.duration <= 0 {
        return Err(AppError::InvalidDuration);
    }
    let duration = u32::try_from(payload.duration).map_err(|_| AppError::InvalidDuration)?;

    let questions = bank
        .sample(&payload.topic, ROOM_QUESTION_COUNT)
        .ok_or_else(|| AppError::InsufficientQuestions(payload.topic.clone()))?;

    let room = store
        .create_room(NewRoom {
            leader_id: payload.leader_id,
            leader_name: payload.leader_name,
            topic: payload.topic,
            questions,
            duration,
            start_time: payload.start_time,
            end_time: payload.end_time,
        })
        .await?;

    tracing::info!("Room {} created for topic '{}'", room.room_code, room.topic);

    Ok((StatusCode::CREATED, Json(RoomSummary::from(&room))))
}

/// Lists rooms. With `?joinable=true`, only rooms whose join window contains
/// the current time (discovery mode).
pub async fn list_rooms(
    State(store): State<RoomStore>,
    Query(params): Query<ListRoomsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rooms = if params.joinable.unwrap_or(false) {
        store.list_joinable(Utc::now()).await
    } else {
        store.list_rooms().await
    };

    let summaries: Vec<RoomSummary> = rooms.iter().map(RoomSummary::from).collect();
    Ok(Json(summaries))
}

/// Looks a room up by code among the currently joinable set.
///
/// Case-insensitive. Codes of expired or closed rooms miss exactly like
/// unknown codes; the caller cannot distinguish them.
pub async fn join_by_code(
    State(store): State<RoomStore>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("Room code must not be empty".to_string()));
    }

    let room = store
        .find_joinable_by_code(code, Utc::now())
        .await
        .ok_or_else(|| AppError::NotFound("Invalid or expired room code".to_string()))?;

    Ok(Json(RoomSummary::from(&room)))
}
