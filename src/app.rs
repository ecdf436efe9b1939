use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/week", get(handlers::get_week))
        .route("/api/week/totals", get(handlers::get_week_summary))
        .route("/api/week/reset", post(handlers::reset_week))
        .route("/api/today", get(handlers::get_today))
        .route("/api/goal", get(handlers::get_goal).put(handlers::put_goal))
        .route("/api/days/:date/workouts", post(handlers::add_workout))
        .route("/api/days/:date/workouts/:id", delete(handlers::remove_workout))
        .route("/api/days/:date/foods", post(handlers::add_food))
        .route("/api/days/:date/foods/:id", delete(handlers::remove_food))
        .route(
            "/api/days/:date/foods/:id/quantity",
            put(handlers::update_food_quantity),
        )
        .with_state(state)
}
