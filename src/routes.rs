// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, leaderboard, room, session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Room creation, discovery and code lookup.
/// * Session lifecycle (start, answer, abandon) and bulk submission.
/// * Live leaderboard stream.
/// * Global middleware (Trace, CORS) and shared state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let room_routes = Router::new()
        .route("/", post(room::create_room).get(room::list_rooms))
        .route("/by-code/{code}", get(room::join_by_code))
        .route("/{room_id}/sessions", post(session::start_session))
        .route("/{room_id}/attempts", post(attempt::submit_attempt))
        .route("/{room_id}/leaderboard", get(leaderboard::stream_leaderboard));

    let session_routes = Router::new()
        .route("/{session_id}", delete(session::abandon_session))
        .route("/{session_id}/answers", post(session::answer));

    Router::new()
        .nest("/rooms", room_routes)
        .nest("/sessions", session_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
