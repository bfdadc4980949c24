// src/handlers/leaderboard.rs

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::{error::AppError, store::RoomStore};

/// Live leaderboard for a room as a Server-Sent Events stream.
///
/// The first event carries the current ranked list; every attempt recorded
/// afterwards triggers a fresh full snapshot. The stream runs until the
/// client disconnects, and reconnecting starts over from current state.
pub async fn stream_leaderboard(
    State(store): State<RoomStore>,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let room = store
        .get_room(room_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No room {}", room_id)))?;

    let stream = store
        .subscribe(&room.room_code)
        .map(|entries| Event::default().event("leaderboard").json_data(&entries));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
