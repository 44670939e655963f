//! Dashboard and history views over the health log resource API.
//!
//! Meals, meal-food links, foods, exercises and weigh-ins are fetched through
//! a [`healthlog_client::HealthLogClient`] and turned into a rolling 7-day
//! [`DashboardSnapshot`] and per-domain history rows. [`ViewCoordinator`]
//! keeps those views in memory and reloads them after every mutation.

pub mod domains;
pub mod error;
pub mod middleware;
pub mod services;
pub mod session;
pub mod state;
mod test_utils;
pub mod types;

pub use domains::dashboard::{
    DashboardSnapshot, DashboardView, build_snapshot, load_dashboard,
};
pub use domains::history::{
    ExerciseHistoryRow, MealHistoryRow, WeighInHistoryRow, exercise_history, meal_history,
    weigh_in_history,
};
pub use domains::meals::{ResolvedMeal, resolve_meal_calories, resolve_meals};
pub use domains::mutations::{ExerciseEntry, FoodLine, LoggedMeal};
pub use domains::progress::ProgressSummary;
pub use domains::{DayRange, Dated};
pub use error::{DashboardError, DashboardResult};
pub use middleware::LoggingMiddleware;
pub use services::{ViewCoordinator, ViewSlot};
pub use session::Session;
pub use state::{HistoryState, LoadState};
