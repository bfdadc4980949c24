// src/session.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::attempt::AttemptReceipt;
use crate::models::question::{PublicQuestion, Question};
use crate::models::room::Room;
use crate::models::session::SessionStarted;
use crate::store::RoomStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    InProgress,
    Submitted,
}

/// How a session reached submission. Logged, and the expired-timer path must
/// not abort its own task.
#[derive(Debug, Clone, Copy)]
enum SubmitCause {
    LastAnswer,
    Bulk,
    TimerExpired,
}

impl SubmitCause {
    fn as_str(self) -> &'static str {
        match self {
            SubmitCause::LastAnswer => "last answer",
            SubmitCause::Bulk => "bulk submission",
            SubmitCause::TimerExpired => "countdown expired",
        }
    }
}

/// One participant's run through a room's question sequence.
///
/// Owned by exactly one participant; the countdown task and the HTTP handlers
/// share it through the mutex, and the state field is the single-fire guard:
/// whichever path locks first and finds `InProgress` records the attempt, the
/// other sees `Submitted`.
struct QuizSession {
    room_code: String,
    user_id: String,
    user_name: String,
    questions: Vec<Question>,
    answers: HashMap<usize, String>,
    current: usize,
    started_at: Instant,
    time_limit: Duration,
    state: SessionState,
    timer: Option<JoinHandle<()>>,
}

impl QuizSession {
    /// Count of answers matching the correct option. Unanswered indices never
    /// match.
    fn score(&self) -> u32 {
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.answers.get(i).is_some_and(|a| a == &q.correct))
            .count() as u32
    }

    fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs().min(self.time_limit.as_secs())
    }
}

/// Result of recording one answer.
#[derive(Debug)]
pub enum AnswerOutcome {
    InProgress {
        next_index: usize,
        answered: usize,
        total: usize,
    },
    Submitted(AttemptReceipt),
}

#[derive(Default)]
struct SessionTable {
    by_id: HashMap<Uuid, Arc<Mutex<QuizSession>>>,
    /// (room id, user id) → open session, for the bulk-submission path.
    by_participant: HashMap<(Uuid, String), Uuid>,
}

/// Registry of live sessions plus the countdown tasks driving them.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    sessions: RwLock<SessionTable>,
    store: RoomStore,
}

impl SessionManager {
    pub fn new(store: RoomStore) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                sessions: RwLock::new(SessionTable::default()),
                store,
            }),
        }
    }

    /// Starts a session against a room snapshot and arms its countdown.
    ///
    /// Starting again for the same room simply opens a fresh session; each
    /// completed one still records its own attempt.
    pub async fn start(&self, room: &Room, user_id: String, user_name: String) -> SessionStarted {
        let session_id = Uuid::new_v4();
        let time_limit = Duration::from_secs(u64::from(room.duration) * 60);
        let public: Vec<PublicQuestion> = room.questions.iter().map(PublicQuestion::from).collect();

        let session = Arc::new(Mutex::new(QuizSession {
            room_code: room.room_code.clone(),
            user_id: user_id.clone(),
            user_name,
            questions: room.questions.clone(),
            answers: HashMap::new(),
            current: 0,
            started_at: Instant::now(),
            time_limit,
            state: SessionState::InProgress,
            timer: None,
        }));

        {
            let mut table = self.inner.sessions.write().await;
            table.by_id.insert(session_id, Arc::clone(&session));
            table
                .by_participant
                .insert((room.id, user_id), session_id);
        }

        let manager = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(time_limit).await;
            match manager.expire(session_id).await {
                Ok(receipt) => {
                    tracing::info!(
                        "Session {} expired, recorded score {} after {}s",
                        session_id,
                        receipt.score,
                        receipt.time_taken
                    );
                }
                // Submitted or abandoned in the meantime.
                Err(AppError::NotFound(_)) | Err(AppError::Conflict(_)) => {}
                Err(e) => {
                    tracing::error!("Failed to record expired session {}: {}", session_id, e);
                }
            }
        });
        session.lock().await.timer = Some(handle);

        tracing::info!(
            "Session {} started for room {} ({}s limit)",
            session_id,
            room.room_code,
            time_limit.as_secs()
        );

        SessionStarted {
            session_id,
            room_code: room.room_code.clone(),
            questions: public,
            expires_in: time_limit.as_secs(),
        }
    }

    /// Records the chosen option for the current question and advances.
    /// Answering the last question submits the session.
    pub async fn answer(&self, session_id: Uuid, answer: String) -> Result<AnswerOutcome, AppError> {
        let session = self.lookup(session_id).await?;
        let mut s = session.lock().await;

        if s.state == SessionState::Submitted {
            return Err(AppError::Conflict("Session already submitted".to_string()));
        }

        let index = s.current;
        s.answers.insert(index, answer);

        if index + 1 < s.questions.len() {
            s.current = index + 1;
            return Ok(AnswerOutcome::InProgress {
                next_index: s.current,
                answered: s.answers.len(),
                total: s.questions.len(),
            });
        }

        let receipt = self.finalize_locked(&mut s, SubmitCause::LastAnswer).await?;
        drop(s);
        self.remove(session_id).await;
        Ok(AnswerOutcome::Submitted(receipt))
    }

    /// Manual-submit path: merges a full answer map into the participant's
    /// open session for the room and finalizes it.
    pub async fn submit(
        &self,
        room_id: Uuid,
        user_id: &str,
        answers: HashMap<usize, String>,
    ) -> Result<AttemptReceipt, AppError> {
        let session_id = {
            let table = self.inner.sessions.read().await;
            table
                .by_participant
                .get(&(room_id, user_id.to_string()))
                .copied()
        }
        .ok_or_else(|| {
            AppError::NotFound(format!("No open session for user '{}' in this room", user_id))
        })?;

        let session = self.lookup(session_id).await?;
        let mut s = session.lock().await;

        if s.state == SessionState::Submitted {
            return Err(AppError::Conflict("Session already submitted".to_string()));
        }
        if let Some(bad) = answers.keys().find(|&&i| i >= s.questions.len()) {
            return Err(AppError::BadRequest(format!(
                "Answer index {} out of range for {} questions",
                bad,
                s.questions.len()
            )));
        }

        s.answers.extend(answers);
        let receipt = self.finalize_locked(&mut s, SubmitCause::Bulk).await?;
        drop(s);
        self.remove(session_id).await;
        Ok(receipt)
    }

    /// Abandons an in-progress session: the countdown is cancelled and no
    /// attempt is recorded. Already-submitted sessions are gone and miss.
    pub async fn abandon(&self, session_id: Uuid) -> Result<(), AppError> {
        let session = {
            let mut table = self.inner.sessions.write().await;
            let session = table
                .by_id
                .remove(&session_id)
                .ok_or_else(|| AppError::NotFound(format!("No session {}", session_id)))?;
            table.by_participant.retain(|_, id| *id != session_id);
            session
        };

        let mut s = session.lock().await;
        if let Some(timer) = s.timer.take() {
            timer.abort();
        }
        tracing::info!("Session {} abandoned", session_id);
        Ok(())
    }

    /// Countdown path into submission; unanswered questions count as wrong.
    async fn expire(&self, session_id: Uuid) -> Result<AttemptReceipt, AppError> {
        let session = self.lookup(session_id).await?;
        let mut s = session.lock().await;

        if s.state == SessionState::Submitted {
            return Err(AppError::Conflict("Session already submitted".to_string()));
        }

        let receipt = self.finalize_locked(&mut s, SubmitCause::TimerExpired).await?;
        drop(s);
        self.remove(session_id).await;
        Ok(receipt)
    }

    async fn lookup(&self, session_id: Uuid) -> Result<Arc<Mutex<QuizSession>>, AppError> {
        self.inner
            .sessions
            .read()
            .await
            .by_id
            .get(&session_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No session {}", session_id)))
    }

    /// Scores and records exactly once. The session mutex is held by the
    /// caller across the recording await, so a concurrent path cannot slip in
    /// between the state check and the write. On a recording failure the
    /// session stays `InProgress` and the error propagates, leaving the caller
    /// free to retry instead of losing the attempt silently.
    async fn finalize_locked(
        &self,
        s: &mut QuizSession,
        cause: SubmitCause,
    ) -> Result<AttemptReceipt, AppError> {
        let score = s.score();
        let time_taken = s.elapsed_secs();

        let attempt_id = self
            .inner
            .store
            .record_attempt(&s.room_code, &s.user_id, &s.user_name, score, time_taken)
            .await?;

        s.state = SessionState::Submitted;
        if !matches!(cause, SubmitCause::TimerExpired) {
            if let Some(timer) = s.timer.take() {
                timer.abort();
            }
        }

        tracing::info!(
            "Session submitted ({}): room {} user {} score {} in {}s",
            cause.as_str(),
            s.room_code,
            s.user_id,
            score,
            time_taken
        );

        Ok(AttemptReceipt {
            attempt_id,
            room_code: s.room_code.clone(),
            score,
            time_taken,
        })
    }

    async fn remove(&self, session_id: Uuid) {
        let mut table = self.inner.sessions.write().await;
        table.by_id.remove(&session_id);
        table.by_participant.retain(|_, id| *id != session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewRoom;
    use chrono::{Duration as ChronoDuration, Utc};

    fn questions() -> Vec<Question> {
        ["JS XML", "Hook", "Facebook"]
            .iter()
            .enumerate()
            .map(|(i, correct)| Question {
                question: format!("Q{}", i),
                options: vec![correct.to_string(), "Wrong".into(), "Also wrong".into(), "No".into()],
                correct: correct.to_string(),
            })
            .collect()
    }

    async fn fixture() -> (RoomStore, SessionManager, Room) {
        let store = RoomStore::new();
        let now = Utc::now();
        let room = store
            .create_room(NewRoom {
                leader_id: "leader".to_string(),
                leader_name: "Leader".to_string(),
                topic: "react".to_string(),
                questions: questions(),
                duration: 1,
                start_time: now - ChronoDuration::minutes(1),
                end_time: now + ChronoDuration::minutes(10),
            })
            .await
            .unwrap();
        let manager = SessionManager::new(store.clone());
        (store, manager, room)
    }

    #[tokio::test]
    async fn answering_every_question_submits_exactly_once() {
        let (store, manager, room) = fixture().await;
        let started = manager
            .start(&room, "u1".to_string(), "Uma".to_string())
            .await;

        let first = manager
            .answer(started.session_id, "JS XML".to_string())
            .await
            .unwrap();
        assert!(matches!(
            first,
            AnswerOutcome::InProgress { next_index: 1, answered: 1, total: 3 }
        ));

        manager
            .answer(started.session_id, "Wrong".to_string())
            .await
            .unwrap();

        let last = manager
            .answer(started.session_id, "Facebook".to_string())
            .await
            .unwrap();
        let receipt = match last {
            AnswerOutcome::Submitted(receipt) => receipt,
            other => panic!("expected submission, got {:?}", other),
        };
        assert_eq!(receipt.score, 2);

        // The session is finished; nothing can fire a second attempt.
        let err = manager
            .answer(started.session_id, "JS XML".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.leaderboard(&room.room_code).await.len(), 1);
    }

    #[tokio::test]
    async fn bulk_submit_scores_missing_answers_as_wrong() {
        let (store, manager, room) = fixture().await;
        manager.start(&room, "u1".to_string(), "Uma".to_string()).await;

        let answers = HashMap::from([(0, "JS XML".to_string()), (2, "Wrong".to_string())]);
        let receipt = manager.submit(room.id, "u1", answers).await.unwrap();
        assert_eq!(receipt.score, 1);

        let again = manager.submit(room.id, "u1", HashMap::new()).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
        assert_eq!(store.leaderboard(&room.room_code).await.len(), 1);
    }

    #[tokio::test]
    async fn bulk_submit_rejects_out_of_range_index() {
        let (_store, manager, room) = fixture().await;
        manager.start(&room, "u1".to_string(), "Uma".to_string()).await;

        let answers = HashMap::from([(7, "JS XML".to_string())]);
        let err = manager.submit(room.id, "u1", answers).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_submits_zero_score_at_full_time() {
        let (store, manager, room) = fixture().await;
        manager.start(&room, "u1".to_string(), "Uma".to_string()).await;

        // Let the 60s countdown fire.
        tokio::time::sleep(Duration::from_secs(61)).await;

        let board = store.leaderboard(&room.room_code).await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 0);
        assert_eq!(board[0].time_taken, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_session_never_records() {
        let (store, manager, room) = fixture().await;
        let started = manager
            .start(&room, "u1".to_string(), "Uma".to_string())
            .await;

        manager.abandon(started.session_id).await.unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(store.leaderboard(&room.room_code).await.is_empty());
    }
}
