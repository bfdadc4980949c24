// src/store.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::attempt::{Attempt, LeaderboardEntry};
use crate::models::question::Question;
use crate::models::room::{Room, RoomStatus};
use crate::utils::room_code;

/// Buffered attempt events per subscriber. A lagged subscriber resynchronizes
/// from current state, so the buffer only has to absorb short bursts.
const ATTEMPT_EVENT_CAPACITY: usize = 64;

/// Everything needed to create a room, minus what the store itself assigns
/// (id, code, status, creation timestamp).
#[derive(Debug)]
pub struct NewRoom {
    pub leader_id: String,
    pub leader_name: String,
    pub topic: String,
    pub questions: Vec<Question>,
    pub duration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// In-memory document store for rooms and attempts.
///
/// Rooms are create-only and attempts append-only, so readers never observe a
/// record changing under them. Every new attempt is fanned out on a broadcast
/// channel keyed by room code, which is what keeps leaderboard subscriptions
/// push-based instead of polling.
#[derive(Clone)]
pub struct RoomStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    rooms: RwLock<HashMap<Uuid, Room>>,
    attempts: RwLock<Vec<Attempt>>,
    attempt_events: broadcast::Sender<String>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        let (attempt_events, _) = broadcast::channel(ATTEMPT_EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                rooms: RwLock::new(HashMap::new()),
                attempts: RwLock::new(Vec::new()),
                attempt_events,
            }),
        }
    }

    /// Creates a room with a freshly generated unique code.
    ///
    /// The write lock is held across code generation and insertion, so two
    /// concurrent creations can never race into the same code.
    pub async fn create_room(&self, new: NewRoom) -> Result<Room, AppError> {
        let mut rooms = self.inner.rooms.write().await;

        let code = room_code::generate(|candidate| {
            rooms
                .values()
                .any(|room| room.room_code.eq_ignore_ascii_case(candidate))
        })?;

        let room = Room {
            id: Uuid::new_v4(),
            room_code: code,
            leader_id: new.leader_id,
            leader_name: new.leader_name,
            topic: new.topic,
            questions: new.questions,
            duration: new.duration,
            start_time: Some(new.start_time),
            end_time: Some(new.end_time),
            status: RoomStatus::Active,
            created_at: Utc::now(),
        };
        rooms.insert(room.id, room.clone());
        Ok(room)
    }

    pub async fn get_room(&self, id: Uuid) -> Option<Room> {
        self.inner.rooms.read().await.get(&id).cloned()
    }

    pub async fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.inner.rooms.read().await.values().cloned().collect();
        rooms.sort_by_key(|room| room.created_at);
        rooms
    }

    /// Rooms currently accepting participants: status ACTIVE and `now` inside
    /// the join window. Rooms missing either timestamp count as joinable.
    pub async fn list_joinable(&self, now: DateTime<Utc>) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .inner
            .rooms
            .read()
            .await
            .values()
            .filter(|room| room.is_joinable(now))
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.created_at);
        rooms
    }

    /// Case-insensitive code lookup against the currently joinable set.
    /// Expired or closed rooms miss, same as unknown codes.
    pub async fn find_joinable_by_code(&self, code: &str, now: DateTime<Utc>) -> Option<Room> {
        self.inner
            .rooms
            .read()
            .await
            .values()
            .find(|room| room.room_code.eq_ignore_ascii_case(code) && room.is_joinable(now))
            .cloned()
    }

    /// Appends one immutable attempt and notifies leaderboard subscribers.
    ///
    /// Fails with `NotFound` when the code does not match any room, so a
    /// session can never record against a vanished room without the caller
    /// hearing about it.
    pub async fn record_attempt(
        &self,
        room_code: &str,
        user_id: &str,
        user_name: &str,
        score: u32,
        time_taken: u64,
    ) -> Result<Uuid, AppError> {
        let known = self
            .inner
            .rooms
            .read()
            .await
            .values()
            .any(|room| room.room_code.eq_ignore_ascii_case(room_code));
        if !known {
            return Err(AppError::NotFound(format!(
                "No room with code '{}'",
                room_code
            )));
        }

        let attempt = Attempt {
            id: Uuid::new_v4(),
            room_code: room_code.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            score,
            time_taken,
            submitted_at: Utc::now(),
        };
        let id = attempt.id;
        self.inner.attempts.write().await.push(attempt);

        // Nobody listening is fine; the send result only reports that.
        let _ = self.inner.attempt_events.send(room_code.to_string());

        Ok(id)
    }

    /// Full ranked leaderboard for a room: score descending, ties broken by
    /// ascending time taken.
    pub async fn leaderboard(&self, room_code: &str) -> Vec<LeaderboardEntry> {
        let mut attempts: Vec<Attempt> = self
            .inner
            .attempts
            .read()
            .await
            .iter()
            .filter(|attempt| attempt.room_code.eq_ignore_ascii_case(room_code))
            .cloned()
            .collect();

        attempts.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.time_taken.cmp(&b.time_taken))
        });

        attempts
            .into_iter()
            .enumerate()
            .map(|(i, attempt)| LeaderboardEntry {
                rank: i + 1,
                user_id: attempt.user_id,
                user_name: attempt.user_name,
                score: attempt.score,
                time_taken: attempt.time_taken,
                submitted_at: attempt.submitted_at,
            })
            .collect()
    }

    /// Push-based leaderboard subscription.
    ///
    /// Emits the current ranked list immediately, then a fresh snapshot every
    /// time an attempt lands for this room. The stream keeps emitting until
    /// the subscriber drops it; a new subscription re-reads current state, so
    /// reconnects lose nothing.
    pub fn subscribe(
        &self,
        room_code: &str,
    ) -> impl Stream<Item = Vec<LeaderboardEntry>> + Send + use<> {
        struct Sub {
            store: RoomStore,
            rx: broadcast::Receiver<String>,
            code: String,
            primed: bool,
        }

        let state = Sub {
            store: self.clone(),
            rx: self.inner.attempt_events.subscribe(),
            code: room_code.to_string(),
            primed: false,
        };

        futures::stream::unfold(state, |mut sub| async move {
            if !sub.primed {
                sub.primed = true;
                let snapshot = sub.store.leaderboard(&sub.code).await;
                return Some((snapshot, sub));
            }
            loop {
                match sub.rx.recv().await {
                    Ok(changed) if changed.eq_ignore_ascii_case(&sub.code) => {
                        let snapshot = sub.store.leaderboard(&sub.code).await;
                        return Some((snapshot, sub));
                    }
                    Ok(_) => continue,
                    // Fell behind the event buffer; current state covers it.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        let snapshot = sub.store.leaderboard(&sub.code).await;
                        return Some((snapshot, sub));
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    #[cfg(test)]
    pub(crate) async fn insert_room(&self, room: Room) {
        self.inner.rooms.write().await.insert(room.id, room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use futures::StreamExt;

    fn question() -> Question {
        Question {
            question: "What is JSX?".to_string(),
            options: vec!["JS XML".into(), "JS HTML".into(), "Template".into(), "Engine".into()],
            correct: "JS XML".to_string(),
        }
    }

    fn new_room(now: DateTime<Utc>) -> NewRoom {
        NewRoom {
            leader_id: "leader-1".to_string(),
            leader_name: "Leader".to_string(),
            topic: "react".to_string(),
            questions: vec![question()],
            duration: 1,
            start_time: now - Duration::minutes(5),
            end_time: now + Duration::minutes(5),
        }
    }

    fn bare_room(code: &str) -> Room {
        Room {
            id: Uuid::new_v4(),
            room_code: code.to_string(),
            leader_id: "leader-1".to_string(),
            leader_name: "Leader".to_string(),
            topic: "react".to_string(),
            questions: vec![question()],
            duration: 1,
            start_time: None,
            end_time: None,
            status: RoomStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn leaderboard_orders_by_score_then_time() {
        let store = RoomStore::new();
        let room = store.create_room(new_room(Utc::now())).await.unwrap();
        let code = room.room_code.as_str();

        store.record_attempt(code, "a", "Alice", 8, 50).await.unwrap();
        store.record_attempt(code, "b", "Bob", 8, 30).await.unwrap();
        store.record_attempt(code, "c", "Cara", 10, 40).await.unwrap();

        let board = store.leaderboard(code).await;
        let order: Vec<(&str, u32, u64)> = board
            .iter()
            .map(|e| (e.user_name.as_str(), e.score, e.time_taken))
            .collect();

        assert_eq!(
            order,
            vec![("Cara", 10, 40), ("Bob", 8, 30), ("Alice", 8, 50)]
        );
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);
    }

    #[tokio::test]
    async fn join_window_filtering() {
        let now = Utc::now();
        let store = RoomStore::new();

        let open = store.create_room(new_room(now)).await.unwrap();

        let mut expired = bare_room("EXPIRD");
        expired.start_time = Some(now - Duration::minutes(20));
        expired.end_time = Some(now - Duration::minutes(10));
        store.insert_room(expired).await;

        let mut closed = bare_room("CLOSED");
        closed.start_time = Some(now - Duration::minutes(5));
        closed.end_time = Some(now + Duration::minutes(5));
        closed.status = RoomStatus::Closed;
        store.insert_room(closed).await;

        // Timestamps not settled yet: joinable by design.
        let unsettled = bare_room("NOTIME");
        store.insert_room(unsettled).await;

        let joinable = store.list_joinable(now).await;
        let codes: Vec<&str> = joinable.iter().map(|r| r.room_code.as_str()).collect();
        assert!(codes.contains(&open.room_code.as_str()));
        assert!(codes.contains(&"NOTIME"));
        assert!(!codes.contains(&"EXPIRD"));
        assert!(!codes.contains(&"CLOSED"));

        assert!(store.find_joinable_by_code("expird", now).await.is_none());
        assert!(
            store
                .find_joinable_by_code(&open.room_code.to_lowercase(), now)
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn record_attempt_requires_a_known_room() {
        let store = RoomStore::new();
        let err = store
            .record_attempt("NOPE42", "a", "Alice", 3, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn subscription_emits_snapshot_then_updates() {
        let store = RoomStore::new();
        let room = store.create_room(new_room(Utc::now())).await.unwrap();

        let mut stream = Box::pin(store.subscribe(&room.room_code));

        let initial = stream.next().await.unwrap();
        assert!(initial.is_empty());

        store
            .record_attempt(&room.room_code, "a", "Alice", 7, 21)
            .await
            .unwrap();

        let updated = stream.next().await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].user_name, "Alice");
        assert_eq!(updated[0].rank, 1);
    }
}
