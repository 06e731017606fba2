use crate::auth::{CurrentUser, User};
use crate::calendar::{self, MonthCursor};
use crate::config::UiConfig;
use crate::errors::AppError;
use crate::grid::{GridView, build_grid_at, normalize_title};
use crate::models::{
    AnalyticsFilter, Habit, HabitDocument, MAX_GOAL, MonthQuery, NewHabitRequest, SessionResponse,
    SignInRequest, ToggleRequest, ToggleResponse, UpdateHabitRequest,
};
use crate::state::AppState;
use crate::stats::{StatsResponse, build_stats_at};
use crate::storage::HabitPatch;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::{NaiveDate, Utc};
use futures_util::stream::{self, Stream};
use std::collections::BTreeMap;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.ui))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_config(State(state): State<AppState>) -> Json<UiConfig> {
    Json(state.ui.as_ref().clone())
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (token, user) = state.auth.sign_in(&payload.name).await?;
    Ok(Json(SessionResponse { token, user }))
}

pub async fn sign_in_guest(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let (token, user) = state.auth.sign_in_guest().await?;
    Ok(Json(SessionResponse { token, user }))
}

pub async fn sign_out(State(state): State<AppState>, current: CurrentUser) -> StatusCode {
    state.auth.sign_out(&current.token).await;
    StatusCode::NO_CONTENT
}

pub async fn get_session(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

pub async fn list_habits(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Habit>>, AppError> {
    Ok(Json(state.store.list(&current.user.uid).await?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let title = normalize_title(&payload.title)
        .ok_or_else(|| AppError::bad_request("title must not be empty"))?;
    let goal = match payload.goal {
        Some(goal) => validate_goal(goal)?,
        None => payload.habit_type.default_goal(),
    };
    let icon = payload
        .icon
        .map(|icon| icon.trim().to_string())
        .filter(|icon| !icon.is_empty())
        .unwrap_or_else(|| payload.habit_type.default_icon().to_string());

    let doc = HabitDocument {
        title,
        habit_type: payload.habit_type,
        goal: Some(goal),
        icon: Some(icon),
        created_at: Utc::now().timestamp_millis(),
        completed_dates: BTreeMap::new(),
    };
    let habit = state.store.add(&current.user.uid, doc).await?;
    info!(uid = %current.user.uid, habit = %habit.id, "habit created");
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let title = payload
        .title
        .map(|raw| {
            normalize_title(&raw).ok_or_else(|| AppError::bad_request("title must not be empty"))
        })
        .transpose()?;
    let goal = payload.goal.map(validate_goal).transpose()?;
    let icon = payload
        .icon
        .map(|icon| icon.trim().to_string())
        .filter(|icon| !icon.is_empty());
    if title.is_none() && goal.is_none() && icon.is_none() {
        return Err(AppError::bad_request("nothing to update"));
    }

    let patch = HabitPatch { title, goal, icon };
    Ok(Json(state.store.update(&current.user.uid, &id, patch).await?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&current.user.uid, &id).await?;
    info!(uid = %current.user.uid, habit = %id, "habit deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let date = calendar::parse_date_key(payload.date.trim())
        .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;
    let today = resolve_today(payload.today.as_deref())?;
    let (habit, outcome) = state
        .store
        .toggle(&current.user.uid, &id, date, today)
        .await?;
    Ok(Json(ToggleResponse { habit, outcome }))
}

/// Server-sent events carrying the user's full habit list on every change.
pub async fn habit_stream(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.store.subscribe(&current.user.uid).await;
    info!(uid = %current.user.uid, "habit stream opened");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let habits = subscription.next().await?;
        Some((Event::default().event("habits").json_data(&habits), subscription))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn get_calendar(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<GridView>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let month = resolve_month(&query, today)?;
    let habits = state.store.list(&current.user.uid).await?;
    Ok(Json(build_grid_at(today, &habits, month)))
}

pub async fn get_stats(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let month = resolve_month(&query, today)?;
    let filter = match query.filter.as_deref() {
        Some(raw) => AnalyticsFilter::parse(raw)
            .ok_or_else(|| AppError::bad_request("filter must be 'build', 'break' or 'all'"))?,
        None => state.ui.default_filter,
    };
    let habits = state.store.list(&current.user.uid).await?;
    Ok(Json(build_stats_at(today, &habits, month, filter)))
}

/// Today as the user sees it. The browser sends its local date because the
/// server may sit in another zone.
fn resolve_today(claimed: Option<&str>) -> Result<NaiveDate, AppError> {
    let claimed = claimed
        .map(|raw| {
            calendar::parse_date_key(raw.trim())
                .ok_or_else(|| AppError::bad_request("today must be YYYY-MM-DD"))
        })
        .transpose()?;
    Ok(calendar::reconcile_today(claimed, calendar::today()))
}

fn resolve_month(query: &MonthQuery, today: NaiveDate) -> Result<MonthCursor, AppError> {
    match query.month.as_deref() {
        Some(raw) => {
            MonthCursor::parse(raw).ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))
        }
        None => Ok(MonthCursor::containing(today)),
    }
}

fn validate_goal(goal: u32) -> Result<u32, AppError> {
    if (1..=MAX_GOAL).contains(&goal) {
        Ok(goal)
    } else {
        Err(AppError::bad_request(format!("goal must be between 1 and {MAX_GOAL}")))
    }
}
