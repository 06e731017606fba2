use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, patch, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/config", get(handlers::get_config))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/guest", post(handlers::sign_in_guest))
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/session", get(handlers::get_session))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/stream", get(handlers::habit_stream))
        .route(
            "/api/habits/:id",
            patch(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
