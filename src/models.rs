use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "calories")]
    pub calories_per_unit: f64,
    pub quantity: f64,
}

impl FoodEntry {
    pub fn total_calories(&self) -> f64 {
        self.calories_per_unit * self.quantity
    }
}

/// One calendar day of the ledger. The three aggregate fields are derived from
/// the entry lists and only change through [`DayRecord::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(rename = "day")]
    pub day_name: String,
    #[serde(rename = "workouts")]
    pub workout_count: u32,
    pub calories_consumed: f64,
    pub calories_burned: f64,
    #[serde(rename = "workoutSessions")]
    pub workout_entries: Vec<WorkoutEntry>,
    #[serde(rename = "foods")]
    pub food_entries: Vec<FoodEntry>,
}

impl DayRecord {
    pub fn empty(date: NaiveDate, day_name: String) -> Self {
        Self {
            date,
            day_name,
            workout_count: 0,
            calories_consumed: 0.0,
            calories_burned: 0.0,
            workout_entries: Vec::new(),
            food_entries: Vec::new(),
        }
    }

    pub fn recompute(&mut self) {
        self.workout_count = self.workout_entries.len() as u32;
        self.calories_burned = self
            .workout_entries
            .iter()
            .map(|entry| entry.calories_burned)
            .sum();
        self.calories_consumed = self
            .food_entries
            .iter()
            .map(FoodEntry::total_calories)
            .sum();
    }
}

/// Monday..Sunday bounds of a ledger week, stored as date keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

impl WeekWindow {
    /// Local midnight of the Monday.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.week_start.and_time(NaiveTime::MIN)
    }

    /// Last millisecond of the Sunday.
    pub fn ends_at(&self) -> NaiveDateTime {
        (self.week_end + Duration::days(1)).and_time(NaiveTime::MIN) - Duration::milliseconds(1)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.starts_at() && instant <= self.ends_at()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLedgerState {
    #[serde(flatten)]
    pub window: WeekWindow,
    #[serde(rename = "activities")]
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekTotals {
    pub workouts: u32,
    pub calories_consumed: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: NaiveDate,
    pub goal: u32,
    pub consumed: f64,
    pub burned: f64,
    pub remaining: f64,
    pub goal_reached: bool,
    pub percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub day: Option<DayRecord>,
    pub progress: Option<DayProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummaryResponse {
    pub week: String,
    pub range: String,
    pub totals: WeekTotals,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalBody {
    pub goal: u32,
}
