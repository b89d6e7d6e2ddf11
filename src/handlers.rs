use crate::errors::AppError;
use crate::models::{
    ConfigRequest, DeleteOutcome, HabitDraft, HabitForm, HabitOutcome, IndexQuery, SyncConfig,
    ToggleOutcome, TrackerView,
};
use crate::state::AppState;
use crate::ui::{encode_query_value, render_index, IndexPage, Panel};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Local;

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let panel = match (query.edit.as_deref(), query.panel.as_deref()) {
        (Some(id), _) => match state.tracker.habit(id).await {
            Some(habit) => Panel::Edit(habit),
            None => Panel::None,
        },
        (None, Some("settings")) => Panel::Settings,
        (None, Some("new")) => Panel::NewHabit,
        _ => Panel::None,
    };

    let page = IndexPage {
        today: today_label(),
        view: state.tracker.view().await,
        config: state.tracker.config().await,
        panel,
    };
    Html(render_index(&page))
}

pub async fn save_habit(
    State(state): State<AppState>,
    Form(form): Form<HabitForm>,
) -> Result<Redirect, AppError> {
    let draft = form.draft();
    let (result, retry) = match form.editing_id() {
        Some(id) => (
            state.tracker.edit(id, &draft).await,
            format!("/?edit={}", encode_query_value(id)),
        ),
        None => (state.tracker.create(&draft).await, "/?panel=new".to_string()),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/")),
        Err(err) if err.status == StatusCode::BAD_REQUEST => Ok(Redirect::to(&retry)),
        Err(err) => Err(err),
    }
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    state.tracker.toggle(&id).await;
    Redirect::to("/")
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    state.tracker.delete(&id).await;
    Redirect::to("/")
}

pub async fn save_settings(
    State(state): State<AppState>,
    Form(payload): Form<ConfigRequest>,
) -> Result<Redirect, AppError> {
    state.tracker.save_config(&payload.endpoint_url).await?;
    Ok(Redirect::to("/"))
}

pub async fn reload(State(state): State<AppState>) -> Redirect {
    // The failure is rendered from the tracker's error state.
    let _ = state.tracker.load().await;
    Redirect::to("/")
}

pub async fn list_habits(State(state): State<AppState>) -> Json<TrackerView> {
    Json(state.tracker.view().await)
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(draft): Json<HabitDraft>,
) -> Result<(StatusCode, Json<HabitOutcome>), AppError> {
    let outcome = state.tracker.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn edit_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<HabitDraft>,
) -> Result<Json<HabitOutcome>, AppError> {
    Ok(Json(state.tracker.edit(&id, &draft).await?))
}

pub async fn remove_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteOutcome> {
    Json(state.tracker.delete(&id).await)
}

pub async fn toggle_habit_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleOutcome>, AppError> {
    state
        .tracker
        .toggle(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("habit {id} not found")))
}

pub async fn get_config(State(state): State<AppState>) -> Json<SyncConfig> {
    Json(state.tracker.config().await)
}

pub async fn put_config(
    State(state): State<AppState>,
    Json(payload): Json<ConfigRequest>,
) -> Result<Json<TrackerView>, AppError> {
    Ok(Json(state.tracker.save_config(&payload.endpoint_url).await?))
}

pub async fn reload_json(State(state): State<AppState>) -> Result<Json<TrackerView>, AppError> {
    state
        .tracker
        .load()
        .await
        .map_err(|err| AppError::bad_gateway(err.to_string()))?;
    Ok(Json(state.tracker.view().await))
}

fn today_label() -> String {
    Local::now().format("%A, %B %-d").to_string()
}
