use crate::calendar::compute_week_window;
use crate::errors::LedgerError;
use crate::ledger::{fresh_ledger, DAYS_PER_WEEK};
use crate::models::{WeekWindow, WeeklyLedgerState};
use chrono::{Duration, NaiveDateTime};
use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};
use tracing::{debug, error, info, warn};

pub const KEY_PREFIX: &str = "health_tracker";
pub const WEEKLY_DATA: &str = "weekly_data";
pub const DAILY_GOAL: &str = "daily_goal";
pub const DEFAULT_DAILY_GOAL: u32 = 2000;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        (**self).set(key, value)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let entries = self
            .entries
            .lock()
            .map_err(|err| LedgerError::PersistenceUnavailable(err.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| LedgerError::PersistenceUnavailable(err.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, LedgerError> {
        Err(LedgerError::PersistenceUnavailable("no storage backend".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), LedgerError> {
        Err(LedgerError::PersistenceUnavailable("no storage backend".into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageKey {
    user: Option<String>,
}

impl StorageKey {
    pub fn global() -> Self {
        Self { user: None }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user: Some(user_id.into()),
        }
    }

    pub fn weekly_data(&self) -> String {
        self.key(WEEKLY_DATA)
    }

    pub fn daily_goal(&self) -> String {
        self.key(DAILY_GOAL)
    }

    fn key(&self, data_type: &str) -> String {
        match &self.user {
            Some(user) => format!("{KEY_PREFIX}_{user}_{data_type}"),
            None => format!("{KEY_PREFIX}_{data_type}"),
        }
    }
}

/// Falls back to a fresh week when nothing usable is stored or the stored
/// week is not the one containing `reference`.
pub fn load_ledger(
    store: &dyn KeyValueStore,
    key: &StorageKey,
    reference: NaiveDateTime,
) -> WeeklyLedgerState {
    let current = compute_week_window(reference);
    match read_ledger(store, &key.weekly_data()) {
        Ok(Some(state)) if state.window.week_start != current.week_start => {
            info!(
                stored = %state.window.week_start,
                current = %current.week_start,
                "new week started, discarding stored ledger"
            );
            fresh_ledger(reference)
        }
        Ok(Some(state)) => match check_shape(&state, &current) {
            Ok(()) => state,
            Err(err) => {
                error!("failed to load weekly ledger: {err}");
                fresh_ledger(reference)
            }
        },
        Ok(None) => fresh_ledger(reference),
        Err(err) => {
            error!("failed to load weekly ledger: {err}");
            fresh_ledger(reference)
        }
    }
}

fn read_ledger(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<WeeklyLedgerState>, LedgerError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

// Seven days, Monday..Sunday, exactly covering the current window.
fn check_shape(state: &WeeklyLedgerState, current: &WeekWindow) -> Result<(), LedgerError> {
    if state.window != *current {
        return Err(LedgerError::MalformedLedger(format!(
            "window {} - {} does not match {} - {}",
            state.window.week_start, state.window.week_end, current.week_start, current.week_end
        )));
    }
    if state.days.len() != DAYS_PER_WEEK as usize {
        return Err(LedgerError::MalformedLedger(format!(
            "expected {DAYS_PER_WEEK} days, found {}",
            state.days.len()
        )));
    }
    for (offset, day) in (0..DAYS_PER_WEEK).zip(&state.days) {
        let expected = current.week_start + Duration::days(offset);
        if day.date != expected {
            return Err(LedgerError::MalformedLedger(format!(
                "day {offset} is {}, expected {expected}",
                day.date
            )));
        }
    }
    Ok(())
}

pub fn save_ledger(store: &dyn KeyValueStore, key: &StorageKey, state: &WeeklyLedgerState) {
    if let Err(err) = write_json(store, &key.weekly_data(), state) {
        warn!("failed to save weekly ledger: {err}");
    }
}

pub fn reset_week(
    store: &dyn KeyValueStore,
    key: &StorageKey,
    reference: NaiveDateTime,
) -> WeeklyLedgerState {
    let state = fresh_ledger(reference);
    save_ledger(store, key, &state);
    info!(week_start = %state.window.week_start, "weekly ledger reset");
    state
}

pub fn load_daily_goal(store: &dyn KeyValueStore, key: &StorageKey) -> u32 {
    match store.get(&key.daily_goal()) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|err| {
            warn!("stored daily goal {raw:?} is not a number: {err}");
            DEFAULT_DAILY_GOAL
        }),
        Ok(None) => DEFAULT_DAILY_GOAL,
        Err(err) => {
            error!("failed to load daily goal: {err}");
            DEFAULT_DAILY_GOAL
        }
    }
}

pub fn save_daily_goal(store: &dyn KeyValueStore, key: &StorageKey, goal: u32) {
    if let Err(err) = store.set(&key.daily_goal(), &goal.to_string()) {
        warn!("failed to save daily goal: {err}");
    }
}

fn write_json(
    store: &dyn KeyValueStore,
    key: &str,
    value: &impl serde::Serialize,
) -> Result<(), LedgerError> {
    let payload = serde_json::to_string_pretty(value)?;
    store.set(key, &payload)?;
    debug!(key, bytes = payload.len(), "persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::add_food;
    use crate::models::FoodEntry;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap()
    }

    fn with_rice(reference: NaiveDateTime) -> WeeklyLedgerState {
        let state = fresh_ledger(reference);
        let date = state.window.week_start;
        add_food(
            &state,
            date,
            FoodEntry {
                id: "f1".into(),
                name: "Rice".into(),
                calories_per_unit: 200.0,
                quantity: 1.5,
            },
        )
        .unwrap()
    }

    fn unique_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("health_ledger_store_{}_{}", std::process::id(), nanos))
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(StorageKey::global().weekly_data(), "health_tracker_weekly_data");
        assert_eq!(
            StorageKey::for_user("u42").weekly_data(),
            "health_tracker_u42_weekly_data"
        );
        assert_eq!(StorageKey::for_user("u42").daily_goal(), "health_tracker_u42_daily_goal");
    }

    #[test]
    fn missing_key_yields_fresh_ledger() {
        let store = MemoryStore::new();
        assert_eq!(load_ledger(&store, &StorageKey::global(), now()), fresh_ledger(now()));
    }

    #[test]
    fn saved_ledger_round_trips_within_its_week() {
        let store = MemoryStore::new();
        let key = StorageKey::global();
        let state = with_rice(now());
        save_ledger(&store, &key, &state);

        let later_that_week = now() + Duration::days(3) + Duration::hours(5);
        assert_eq!(load_ledger(&store, &key, later_that_week), state);
        assert_eq!(load_ledger(&store, &key, now()), load_ledger(&store, &key, now()));
    }

    #[test]
    fn stored_ledger_from_earlier_week_is_discarded() {
        let store = MemoryStore::new();
        let key = StorageKey::global();
        let old = with_rice(now() - Duration::days(8));
        save_ledger(&store, &key, &old);

        assert_eq!(load_ledger(&store, &key, now()), fresh_ledger(now()));
    }

    #[test]
    fn malformed_json_falls_back_to_fresh() {
        let store = MemoryStore::new();
        let key = StorageKey::global();
        store.set(&key.weekly_data(), "{not json").unwrap();
        assert_eq!(load_ledger(&store, &key, now()), fresh_ledger(now()));

        store.set(&key.weekly_data(), r#"{"weekStart":"2024-01-01"}"#).unwrap();
        assert_eq!(load_ledger(&store, &key, now()), fresh_ledger(now()));
    }

    #[test]
    fn stored_ledger_with_broken_shape_falls_back_to_fresh() {
        let store = MemoryStore::new();
        let key = StorageKey::global();

        store
            .set(
                &key.weekly_data(),
                r#"{"weekStart":"2024-01-01","weekEnd":"1999-01-01","activities":[]}"#,
            )
            .unwrap();
        let loaded = load_ledger(&store, &key, now());
        assert_eq!(loaded, fresh_ledger(now()));
        let date = loaded.window.week_start;
        let food = FoodEntry {
            id: "f1".into(),
            name: "Rice".into(),
            calories_per_unit: 200.0,
            quantity: 1.0,
        };
        assert!(add_food(&loaded, date, food).is_ok());

        let mut short = with_rice(now());
        short.days.truncate(6);
        save_ledger(&store, &key, &short);
        assert_eq!(load_ledger(&store, &key, now()), fresh_ledger(now()));

        let mut shuffled = with_rice(now());
        shuffled.days.swap(0, 1);
        save_ledger(&store, &key, &shuffled);
        assert_eq!(load_ledger(&store, &key, now()), fresh_ledger(now()));
    }

    #[test]
    fn unavailable_backend_never_raises() {
        let key = StorageKey::global();
        let state = reset_week(&UnavailableStore, &key, now());
        assert_eq!(state, fresh_ledger(now()));
        save_ledger(&UnavailableStore, &key, &with_rice(now()));
        assert_eq!(load_ledger(&UnavailableStore, &key, now()), fresh_ledger(now()));
        assert_eq!(load_daily_goal(&UnavailableStore, &key), DEFAULT_DAILY_GOAL);
    }

    #[test]
    fn persisted_shape_uses_activity_field_names() {
        let store = MemoryStore::new();
        let key = StorageKey::global();
        save_ledger(&store, &key, &with_rice(now()));

        let raw = store.get(&key.weekly_data()).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["weekStart"], "2024-01-01");
        assert_eq!(value["weekEnd"], "2024-01-07");
        assert_eq!(value["activities"][0]["day"], "Monday");
        assert_eq!(value["activities"][0]["caloriesConsumed"], 300.0);
        assert_eq!(value["activities"][0]["foods"][0]["calories"], 200.0);
    }

    #[test]
    fn users_do_not_share_ledgers() {
        let store = MemoryStore::new();
        save_ledger(&store, &StorageKey::for_user("alice"), &with_rice(now()));
        assert_eq!(
            load_ledger(&store, &StorageKey::for_user("bob"), now()),
            fresh_ledger(now())
        );
    }

    #[test]
    fn daily_goal_defaults_and_persists() {
        let store = MemoryStore::new();
        let key = StorageKey::for_user("alice");
        assert_eq!(load_daily_goal(&store, &key), DEFAULT_DAILY_GOAL);
        save_daily_goal(&store, &key, 1800);
        assert_eq!(load_daily_goal(&store, &key), 1800);
        store.set(&key.daily_goal(), "lots").unwrap();
        assert_eq!(load_daily_goal(&store, &key), DEFAULT_DAILY_GOAL);
    }

    #[test]
    fn file_store_reads_back_and_treats_missing_as_absent() {
        let dir = unique_dir();
        let store = FileStore::new(&dir);
        assert_eq!(store.get("absent").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        let _ = fs::remove_dir_all(&dir);
    }
}
