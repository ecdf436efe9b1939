use crate::models::WeekWindow;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Window of the week containing `reference`: the Monday on or before it
/// through the following Sunday.
pub fn compute_week_window(reference: NaiveDateTime) -> WeekWindow {
    let week_start = week_start(reference.date());
    WeekWindow {
        week_start,
        week_end: week_start + Duration::days(6),
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

pub fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Human range such as `Jan 1 - Jan 7, 2024`.
pub fn week_range_label(window: &WeekWindow) -> String {
    format!(
        "{} - {}",
        window.week_start.format("%b %-d"),
        window.week_end.format("%b %-d, %Y")
    )
}
