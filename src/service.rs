use crate::errors::LedgerError;
use crate::ledger;
use crate::models::{FoodEntry, WeeklyLedgerState, WorkoutEntry};
use crate::storage::{self, KeyValueStore, StorageKey};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

/// Ledger operations bound to one store and key; mutations write through.
pub struct LedgerService<S> {
    store: S,
    key: StorageKey,
}

impl<S: KeyValueStore> LedgerService<S> {
    pub fn new(store: S, key: StorageKey) -> Self {
        Self { store, key }
    }

    pub fn load(&self, reference: NaiveDateTime) -> WeeklyLedgerState {
        storage::load_ledger(&self.store, &self.key, reference)
    }

    pub fn save(&self, state: &WeeklyLedgerState) {
        storage::save_ledger(&self.store, &self.key, state);
    }

    pub fn refresh(&self, state: WeeklyLedgerState, reference: NaiveDateTime) -> WeeklyLedgerState {
        if state.window.contains(reference) {
            state
        } else {
            self.load(reference)
        }
    }

    pub fn reset_week(&self, reference: NaiveDateTime) -> WeeklyLedgerState {
        storage::reset_week(&self.store, &self.key, reference)
    }

    pub fn add_workout(
        &self,
        state: &WeeklyLedgerState,
        date: NaiveDate,
        entry: WorkoutEntry,
    ) -> WeeklyLedgerState {
        self.commit(state, ledger::add_workout(state, date, entry))
    }

    pub fn remove_workout(
        &self,
        state: &WeeklyLedgerState,
        date: NaiveDate,
        entry_id: &str,
    ) -> WeeklyLedgerState {
        self.commit(state, ledger::remove_workout(state, date, entry_id))
    }

    pub fn add_food(
        &self,
        state: &WeeklyLedgerState,
        date: NaiveDate,
        entry: FoodEntry,
    ) -> WeeklyLedgerState {
        self.commit(state, ledger::add_food(state, date, entry))
    }

    pub fn remove_food(
        &self,
        state: &WeeklyLedgerState,
        date: NaiveDate,
        entry_id: &str,
    ) -> WeeklyLedgerState {
        self.commit(state, ledger::remove_food(state, date, entry_id))
    }

    pub fn update_food_quantity(
        &self,
        state: &WeeklyLedgerState,
        date: NaiveDate,
        entry_id: &str,
        quantity: f64,
    ) -> WeeklyLedgerState {
        self.commit(
            state,
            ledger::update_food_quantity(state, date, entry_id, quantity),
        )
    }

    pub fn daily_goal(&self) -> u32 {
        storage::load_daily_goal(&self.store, &self.key)
    }

    pub fn set_daily_goal(&self, goal: u32) {
        storage::save_daily_goal(&self.store, &self.key, goal);
    }

    fn commit(
        &self,
        current: &WeeklyLedgerState,
        outcome: Result<WeeklyLedgerState, LedgerError>,
    ) -> WeeklyLedgerState {
        match outcome {
            Ok(next) => {
                self.save(&next);
                next
            }
            Err(err @ LedgerError::ReferenceNotFound { .. }) => {
                debug!("ignoring ledger update: {err}");
                current.clone()
            }
            Err(err @ LedgerError::InvalidEntry(_)) => {
                warn!("rejected ledger update: {err}");
                current.clone()
            }
            Err(err) => {
                warn!("ledger update failed: {err}");
                current.clone()
            }
        }
    }
}
