use crate::calendar::{compute_week_window, day_name};
use crate::errors::LedgerError;
use crate::models::{
    DayProgress, DayRecord, FoodEntry, WeekTotals, WeeklyLedgerState, WorkoutEntry,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const DAYS_PER_WEEK: i64 = 7;

pub fn fresh_ledger(reference: NaiveDateTime) -> WeeklyLedgerState {
    let window = compute_week_window(reference);
    let days = (0..DAYS_PER_WEEK)
        .map(|offset| {
            let date = window.week_start + Duration::days(offset);
            DayRecord::empty(date, day_name(date))
        })
        .collect();

    WeeklyLedgerState { window, days }
}

pub fn week_totals(state: &WeeklyLedgerState) -> WeekTotals {
    state
        .days
        .iter()
        .fold(WeekTotals::default(), |totals, day| WeekTotals {
            workouts: totals.workouts.saturating_add(day.workout_count),
            calories_consumed: totals.calories_consumed + day.calories_consumed,
            calories_burned: totals.calories_burned + day.calories_burned,
        })
}

pub fn day(state: &WeeklyLedgerState, date: NaiveDate) -> Option<&DayRecord> {
    state.days.iter().find(|day| day.date == date)
}

pub fn current_day(state: &WeeklyLedgerState, reference: NaiveDateTime) -> Option<&DayRecord> {
    day(state, reference.date())
}

pub fn add_workout(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    entry: WorkoutEntry,
) -> Result<WeeklyLedgerState, LedgerError> {
    check_amount("duration", entry.duration_minutes)?;
    check_amount("caloriesBurned", entry.calories_burned)?;
    update_day(state, date, |day| {
        day.workout_entries.push(entry);
        Ok(())
    })
}

pub fn remove_workout(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    entry_id: &str,
) -> Result<WeeklyLedgerState, LedgerError> {
    update_day(state, date, |day| {
        let before = day.workout_entries.len();
        day.workout_entries.retain(|entry| entry.id != entry_id);
        if day.workout_entries.len() == before {
            return Err(missing_entry(date, entry_id));
        }
        Ok(())
    })
}

pub fn add_food(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    entry: FoodEntry,
) -> Result<WeeklyLedgerState, LedgerError> {
    check_amount("calories", entry.calories_per_unit)?;
    check_amount("quantity", entry.quantity)?;
    update_day(state, date, |day| {
        day.food_entries.push(entry);
        Ok(())
    })
}

pub fn remove_food(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    entry_id: &str,
) -> Result<WeeklyLedgerState, LedgerError> {
    update_day(state, date, |day| {
        let before = day.food_entries.len();
        day.food_entries.retain(|entry| entry.id != entry_id);
        if day.food_entries.len() == before {
            return Err(missing_entry(date, entry_id));
        }
        Ok(())
    })
}

/// Remove-then-append: the edited entry moves to the end of its day.
pub fn update_food_quantity(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    entry_id: &str,
    quantity: f64,
) -> Result<WeeklyLedgerState, LedgerError> {
    check_amount("quantity", quantity)?;
    let existing = day(state, date)
        .ok_or_else(|| missing_day(date))?
        .food_entries
        .iter()
        .find(|entry| entry.id == entry_id)
        .cloned()
        .ok_or_else(|| missing_entry(date, entry_id))?;

    let removed = remove_food(state, date, entry_id)?;
    add_food(&removed, date, FoodEntry { quantity, ..existing })
}

pub fn day_progress(day: &DayRecord, goal: u32) -> DayProgress {
    let goal_calories = f64::from(goal);
    let consumed = day.calories_consumed;
    let percent = if goal == 0 { 0.0 } else { consumed / goal_calories * 100.0 };

    DayProgress {
        date: day.date,
        goal,
        consumed,
        burned: day.calories_burned,
        remaining: (goal_calories - consumed).max(0.0),
        goal_reached: consumed >= goal_calories,
        percent,
    }
}

fn update_day(
    state: &WeeklyLedgerState,
    date: NaiveDate,
    apply: impl FnOnce(&mut DayRecord) -> Result<(), LedgerError>,
) -> Result<WeeklyLedgerState, LedgerError> {
    let mut next = state.clone();
    let day = next
        .days
        .iter_mut()
        .find(|day| day.date == date)
        .ok_or_else(|| missing_day(date))?;

    apply(day)?;
    day.recompute();
    Ok(next)
}

fn check_amount(field: &str, value: f64) -> Result<(), LedgerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(LedgerError::InvalidEntry(format!(
            "{field} must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn missing_day(date: NaiveDate) -> LedgerError {
    LedgerError::ReferenceNotFound {
        date: date.to_string(),
        entry_id: None,
    }
}

fn missing_entry(date: NaiveDate, entry_id: &str) -> LedgerError {
    LedgerError::ReferenceNotFound {
        date: date.to_string(),
        entry_id: Some(entry_id.to_string()),
    }
}
