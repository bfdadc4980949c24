use std::sync::Arc;

use axum::extract::FromRef;

use crate::bank::QuestionBank;
use crate::config::Config;
use crate::session::SessionManager;
use crate::store::RoomStore;

#[derive(Clone)]
pub struct AppState {
    pub store: RoomStore,
    pub sessions: SessionManager,
    pub bank: Arc<QuestionBank>,
    pub config: Config,
}

impl AppState {
    pub fn new(bank: QuestionBank, config: Config) -> Self {
        let store = RoomStore::new();
        let sessions = SessionManager::new(store.clone());
        Self {
            store,
            sessions,
            bank: Arc::new(bank),
            config,
        }
    }
}

impl FromRef<AppState> for RoomStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<QuestionBank> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.bank)
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
