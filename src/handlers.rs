use crate::calendar::{parse_date_key, week_label, week_range_label};
use crate::errors::AppError;
use crate::ledger::{current_day, day_progress, week_totals};
use crate::models::{
    FoodEntry, GoalBody, QuantityRequest, TodayResponse, WeekSummaryResponse, WeeklyLedgerState,
    WorkoutEntry,
};
use crate::service::LedgerService;
use crate::state::{AppState, SharedStore};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

type Service = LedgerService<SharedStore>;

pub async fn get_week(
    State(state): State<AppState>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let ledger = with_ledger(&state, |_, ledger, _| ledger.clone()).await?;
    Ok(Json(ledger))
}

pub async fn get_week_summary(
    State(state): State<AppState>,
) -> Result<Json<WeekSummaryResponse>, AppError> {
    let summary = with_ledger(&state, |_, ledger, _| WeekSummaryResponse {
        week: week_label(ledger.window.week_start),
        range: week_range_label(&ledger.window),
        totals: week_totals(ledger),
    })
    .await?;
    Ok(Json(summary))
}

pub async fn reset_week(
    State(state): State<AppState>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let ledger = with_ledger(&state, |service, ledger, now| {
        *ledger = service.reset_week(now);
        ledger.clone()
    })
    .await?;
    Ok(Json(ledger))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let today = with_ledger(&state, |service, ledger, now| {
        let day = current_day(ledger, now).cloned();
        let progress = day
            .as_ref()
            .map(|day| day_progress(day, service.daily_goal()));
        TodayResponse { day, progress }
    })
    .await?;
    Ok(Json(today))
}

pub async fn get_goal(State(state): State<AppState>) -> Result<Json<GoalBody>, AppError> {
    let service = state.service.clone();
    let goal = run_blocking(move || service.daily_goal()).await?;
    Ok(Json(GoalBody { goal }))
}

pub async fn put_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalBody>,
) -> Result<Json<GoalBody>, AppError> {
    if payload.goal == 0 {
        return Err(AppError::bad_request("goal must be greater than zero"));
    }
    let service = state.service.clone();
    let goal = payload.goal;
    run_blocking(move || service.set_daily_goal(goal)).await?;
    info!(goal, "daily goal updated");
    Ok(Json(payload))
}

pub async fn add_workout(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(entry): Json<WorkoutEntry>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let date = parse_date(&date)?;
    validate_id(&entry.id)?;
    validate_amount("duration", entry.duration_minutes)?;
    validate_amount("caloriesBurned", entry.calories_burned)?;

    mutate(&state, move |service, ledger| {
        service.add_workout(ledger, date, entry)
    })
    .await
}

pub async fn remove_workout(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let date = parse_date(&date)?;
    mutate(&state, move |service, ledger| {
        service.remove_workout(ledger, date, &id)
    })
    .await
}

pub async fn add_food(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(entry): Json<FoodEntry>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let date = parse_date(&date)?;
    validate_id(&entry.id)?;
    validate_amount("calories", entry.calories_per_unit)?;
    validate_amount("quantity", entry.quantity)?;

    mutate(&state, move |service, ledger| service.add_food(ledger, date, entry)).await
}

pub async fn remove_food(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let date = parse_date(&date)?;
    mutate(&state, move |service, ledger| {
        service.remove_food(ledger, date, &id)
    })
    .await
}

pub async fn update_food_quantity(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Json(payload): Json<QuantityRequest>,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let date = parse_date(&date)?;
    let quantity = payload.quantity;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::bad_request("quantity must be greater than zero"));
    }

    mutate(&state, move |service, ledger| {
        service.update_food_quantity(ledger, date, &id, quantity)
    })
    .await
}

async fn mutate(
    state: &AppState,
    apply: impl FnOnce(&Service, &WeeklyLedgerState) -> WeeklyLedgerState + Send + 'static,
) -> Result<Json<WeeklyLedgerState>, AppError> {
    let ledger = with_ledger(state, move |service, ledger, _| {
        *ledger = apply(service, ledger);
        ledger.clone()
    })
    .await?;
    Ok(Json(ledger))
}

/// Runs `apply` on a blocking thread while holding the ledger lock, after
/// swapping in the stored ledger if the week has turned over.
async fn with_ledger<T: Send + 'static>(
    state: &AppState,
    apply: impl FnOnce(&Service, &mut WeeklyLedgerState, NaiveDateTime) -> T + Send + 'static,
) -> Result<T, AppError> {
    let mut ledger = state.ledger.clone().lock_owned().await;
    let service = state.service.clone();
    let now = state.clock.now();
    run_blocking(move || {
        let refreshed = service.refresh(ledger.clone(), now);
        *ledger = refreshed;
        apply(&service, &mut ledger, now)
    })
    .await
}

async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> T + Send + 'static,
) -> Result<T, AppError> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(AppError::internal)
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(raw).ok_or_else(|| AppError::bad_request("date must be formatted yyyy-mm-dd"))
}

fn validate_id(id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::bad_request("id must not be empty"));
    }
    Ok(())
}

fn validate_amount(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::bad_request(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
