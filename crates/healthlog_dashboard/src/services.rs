use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use healthlog_client::{HealthLogClient, MealType, ToDayKey, UserExercise, WeighIn};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domains::DayRange;
use crate::domains::dashboard::{DashboardView, load_dashboard};
use crate::domains::history::{exercise_history, meal_history, weigh_in_history};
use crate::domains::mutations::{
    ExerciseEntry, FoodLine, LoggedMeal, log_exercises, log_meal, log_weigh_in,
};
use crate::state::{
    EXERCISE_HISTORY_ERROR, HistoryState, LoadState, MEAL_HISTORY_ERROR, WEIGH_IN_HISTORY_ERROR,
};
use crate::{DashboardError, DashboardResult, Session};

pub const STALE_LOADS_TOTAL: &str = "healthlog_stale_loads_total";

/// A view slot written by asynchronous loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewSlot {
    Dashboard,
    Meals,
    Exercises,
    WeighIns,
}

impl ViewSlot {
    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewSlot::Dashboard => "dashboard",
            ViewSlot::Meals => "meals",
            ViewSlot::Exercises => "exercises",
            ViewSlot::WeighIns => "weigh_ins",
        }
    }
}

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Owns the in-memory view state and keeps it in step with the server.
///
/// Every load takes a fresh epoch for its slot and only writes its result if
/// no newer load for that slot has started meanwhile. Mutations never patch
/// rows in place; they re-run the loads of the affected views.
#[derive(Clone)]
pub struct ViewCoordinator {
    client: Arc<dyn HealthLogClient>,
    session: Session,
    today: Today,
    epochs: Arc<[AtomicU64; 4]>,
    dashboard: Arc<Mutex<LoadState<DashboardView>>>,
    history: Arc<Mutex<HistoryState>>,
}

impl ViewCoordinator {
    pub fn new(client: Arc<dyn HealthLogClient>, session: Session) -> Self {
        Self {
            client,
            session,
            today: Arc::new(|| chrono::Local::now().date_naive()),
            epochs: Arc::new(Default::default()),
            dashboard: Arc::new(Mutex::new(LoadState::Idle)),
            history: Arc::new(Mutex::new(HistoryState::default())),
        }
    }

    /// Replace the clock used to decide which day is "today".
    pub fn with_today<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn dashboard(&self) -> LoadState<DashboardView> {
        self.dashboard.lock().await.clone()
    }

    pub async fn history(&self) -> HistoryState {
        self.history.lock().await.clone()
    }

    fn begin(&self, slot: ViewSlot) -> u64 {
        self.epochs[slot.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, slot: ViewSlot, epoch: u64) -> bool {
        self.epochs[slot.index()].load(Ordering::SeqCst) == epoch
    }

    fn discard(&self, slot: ViewSlot, epoch: u64) -> bool {
        debug!(slot = slot.as_str(), epoch, "discarding stale load");
        metrics::counter!(STALE_LOADS_TOTAL, "view" => slot.as_str()).increment(1);
        false
    }

    /// Write to `cell` only while `epoch` is still the latest load of `slot`.
    async fn apply_to<S, F>(&self, cell: &Mutex<S>, slot: ViewSlot, epoch: u64, update: F) -> bool
    where
        F: FnOnce(&mut S),
    {
        let mut state = cell.lock().await;
        if !self.is_current(slot, epoch) {
            return self.discard(slot, epoch);
        }
        update(&mut state);
        true
    }

    // === Dashboard ===

    /// Reload the dashboard. Returns `false` if a newer load superseded this one.
    pub async fn refresh_dashboard(&self) -> bool {
        let slot = ViewSlot::Dashboard;
        let epoch = self.begin(slot);
        self.apply_to(&self.dashboard, slot, epoch, |s| *s = LoadState::Loading)
            .await;

        let view = load_dashboard(self.client.as_ref(), &self.session, (self.today)()).await;

        self.apply_to(&self.dashboard, slot, epoch, |s| *s = LoadState::Loaded(view))
            .await
    }

    // === History ===

    /// Display `range` and load all three domains for it concurrently.
    pub async fn load_range(&self, range: DayRange) {
        self.history.lock().await.range = Some(range.clone());
        tokio::join!(
            self.load_meals(&range),
            self.load_exercises(&range),
            self.load_weigh_ins(&range),
        );
    }

    async fn apply<F>(&self, slot: ViewSlot, epoch: u64, update: F) -> bool
    where
        F: FnOnce(&mut HistoryState),
    {
        self.apply_to(&self.history, slot, epoch, update).await
    }

    pub async fn load_meals(&self, range: &DayRange) -> bool {
        let epoch = self.begin(ViewSlot::Meals);
        self.apply(ViewSlot::Meals, epoch, |s| s.meals = LoadState::Loading)
            .await;
        let result = meal_history(self.client.as_ref(), &self.session, range).await;
        self.apply(ViewSlot::Meals, epoch, |s| {
            s.meals = match result {
                Ok(rows) => LoadState::Loaded(rows),
                Err(e) => {
                    warn!(error = %e, ?range, "meal history failed");
                    LoadState::Failed(MEAL_HISTORY_ERROR.to_string())
                }
            }
        })
        .await
    }

    pub async fn load_exercises(&self, range: &DayRange) -> bool {
        let epoch = self.begin(ViewSlot::Exercises);
        self.apply(ViewSlot::Exercises, epoch, |s| {
            s.exercises = LoadState::Loading
        })
        .await;
        let result = exercise_history(self.client.as_ref(), &self.session, range).await;
        self.apply(ViewSlot::Exercises, epoch, |s| {
            s.exercises = match result {
                Ok(rows) => LoadState::Loaded(rows),
                Err(e) => {
                    warn!(error = %e, ?range, "exercise history failed");
                    LoadState::Failed(EXERCISE_HISTORY_ERROR.to_string())
                }
            }
        })
        .await
    }

    pub async fn load_weigh_ins(&self, range: &DayRange) -> bool {
        let epoch = self.begin(ViewSlot::WeighIns);
        self.apply(ViewSlot::WeighIns, epoch, |s| {
            s.weigh_ins = LoadState::Loading
        })
        .await;
        let result = weigh_in_history(self.client.as_ref(), &self.session, range).await;
        self.apply(ViewSlot::WeighIns, epoch, |s| {
            s.weigh_ins = match result {
                Ok(rows) => LoadState::Loaded(rows),
                Err(e) => {
                    warn!(error = %e, ?range, "weigh-in history failed");
                    LoadState::Failed(WEIGH_IN_HISTORY_ERROR.to_string())
                }
            }
        })
        .await
    }

    /// Re-run the loads of every view a mutation of `slot` can change.
    async fn reload_after_mutation(&self, slot: ViewSlot) {
        let range = self.history.lock().await.range.clone();
        let dashboard_shown = !self.dashboard.lock().await.is_idle();
        let history = async {
            if let Some(range) = range {
                match slot {
                    ViewSlot::Meals => {
                        self.load_meals(&range).await;
                    }
                    ViewSlot::Exercises => {
                        self.load_exercises(&range).await;
                    }
                    ViewSlot::WeighIns => {
                        self.load_weigh_ins(&range).await;
                    }
                    ViewSlot::Dashboard => {}
                }
            }
        };
        let dashboard = async {
            if dashboard_shown {
                self.refresh_dashboard().await;
            }
        };
        tokio::join!(history, dashboard);
    }

    // === Mutations ===

    pub async fn delete_meal_line(&self, meal_food_id: i64) -> DashboardResult<()> {
        self.client
            .delete_meal_food(meal_food_id)
            .await
            .map_err(|e| DashboardError::mutation("meal entry", e))?;
        self.reload_after_mutation(ViewSlot::Meals).await;
        Ok(())
    }

    pub async fn delete_exercise(&self, id: i64) -> DashboardResult<()> {
        self.client
            .delete_user_exercise(id)
            .await
            .map_err(|e| DashboardError::mutation("exercise", e))?;
        self.reload_after_mutation(ViewSlot::Exercises).await;
        Ok(())
    }

    pub async fn delete_weigh_in(&self, weigh_in_id: i64) -> DashboardResult<()> {
        self.client
            .delete_weigh_in(weigh_in_id)
            .await
            .map_err(|e| DashboardError::mutation("weigh-in", e))?;
        self.reload_after_mutation(ViewSlot::WeighIns).await;
        Ok(())
    }

    /// Log a meal. A partially saved meal still exists on the server, so the
    /// views are reloaded before the error is returned.
    pub async fn log_meal(
        &self,
        meal_type: MealType,
        date: NaiveDate,
        lines: &[FoodLine],
    ) -> DashboardResult<LoggedMeal> {
        let result = log_meal(self.client.as_ref(), &self.session, meal_type, date, lines).await;
        if matches!(result, Ok(_) | Err(DashboardError::PartialMutation { .. })) {
            self.reload_after_mutation(ViewSlot::Meals).await;
        }
        result
    }

    pub async fn log_exercises(
        &self,
        date: NaiveDate,
        entries: &[ExerciseEntry],
    ) -> DashboardResult<Vec<UserExercise>> {
        let created = log_exercises(self.client.as_ref(), &self.session, date, entries).await?;
        self.reload_after_mutation(ViewSlot::Exercises).await;
        Ok(created)
    }

    pub async fn log_weigh_in(
        &self,
        date: NaiveDate,
        weight: f64,
        notes: Option<&str>,
    ) -> DashboardResult<WeighIn> {
        let saved = log_weigh_in(self.client.as_ref(), &self.session, date, weight, notes).await?;
        debug!(weigh_in_id = saved.weigh_in_id, date = %date.to_day_key(), "weigh-in saved");
        self.reload_after_mutation(ViewSlot::WeighIns).await;
        Ok(saved)
    }
}
