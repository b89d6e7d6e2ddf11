use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::save_habit))
        .route("/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/habits/:id/delete", post(handlers::delete_habit))
        .route("/settings", post(handlers::save_settings))
        .route("/reload", post(handlers::reload))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            put(handlers::edit_habit).delete(handlers::remove_habit),
        )
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit_json))
        .route("/api/config", get(handlers::get_config).put(handlers::put_config))
        .route("/api/reload", post(handlers::reload_json))
        .with_state(state)
}
