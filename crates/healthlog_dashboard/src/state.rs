use schemars::JsonSchema;
use serde::Serialize;

use crate::domains::DayRange;
use crate::domains::history::{ExerciseHistoryRow, MealHistoryRow, WeighInHistoryRow};

pub const MEAL_HISTORY_ERROR: &str = "Failed to load meal history";
pub const EXERCISE_HISTORY_ERROR: &str = "Failed to load exercise history";
pub const WEIGH_IN_HISTORY_ERROR: &str = "Failed to load weigh-in history";

#[derive(Debug, Serialize, JsonSchema, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }
}

/// History view: the displayed range and one load state per domain.
#[derive(Debug, Serialize, JsonSchema, Clone, Default, PartialEq)]
pub struct HistoryState {
    pub range: Option<DayRange>,
    pub meals: LoadState<Vec<MealHistoryRow>>,
    pub exercises: LoadState<Vec<ExerciseHistoryRow>>,
    pub weigh_ins: LoadState<Vec<WeighInHistoryRow>>,
}

impl HistoryState {
    /// Rows of a domain; a failed or pending domain shows none.
    pub fn meal_rows(&self) -> &[MealHistoryRow] {
        self.meals.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn exercise_rows(&self) -> &[ExerciseHistoryRow] {
        self.exercises.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn weigh_in_rows(&self) -> &[WeighInHistoryRow] {
        self.weigh_ins.loaded().map(Vec::as_slice).unwrap_or_default()
    }
}
