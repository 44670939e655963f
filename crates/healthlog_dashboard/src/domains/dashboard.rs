//! Rolling 7-day dashboard.
//!
//! The three collections are fetched concurrently. Each one degrades to an
//! empty list when its fetch fails, so a dashboard is always produced.

use chrono::NaiveDate;
use healthlog_client::{HealthLogClient, ToDayKey, UserExercise, UserProfile, WeighIn};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use super::aggregate::{net_calorie_series, weight_series, window_dates, window_range};
use super::chart::{MinMaxScale, SymmetricScale};
use super::meals::{ResolvedMeal, resolve_meals};
use super::progress::ProgressSummary;
use super::range::{DayRange, Dated, filter_range, filter_user_exercises};
use super::{recover, round1};
use crate::Session;

/// Recomputed on every load; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct DashboardSnapshot {
    pub calories_in: i64,
    pub calories_out: i64,
    /// Weight of the most recent reading by date, one decimal.
    pub latest_weigh_in: f64,
    pub weight_history: Vec<f64>,
    /// Net calories per day.
    pub calories_history: Vec<f64>,
}

/// Snapshot plus everything derived from it for display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct DashboardView {
    pub snapshot: DashboardSnapshot,
    pub profile: UserProfile,
    pub progress: ProgressSummary,
    pub weight_bars: Vec<f64>,
    pub calorie_bars: Vec<f64>,
    pub day_keys: Vec<String>,
    pub day_labels: Vec<String>,
}

impl DashboardView {
    pub fn assemble(snapshot: DashboardSnapshot, profile: UserProfile, today: NaiveDate) -> Self {
        let dates = window_dates(today);
        Self {
            progress: ProgressSummary::compute(&snapshot, &profile),
            weight_bars: MinMaxScale::default().scale(&snapshot.weight_history),
            calorie_bars: SymmetricScale::default().scale(&snapshot.calories_history),
            day_keys: dates.iter().map(|d| d.to_day_key()).collect(),
            day_labels: dates.iter().map(|d| d.format("%a").to_string()).collect(),
            snapshot,
            profile,
        }
    }
}

async fn window_meals<C>(client: &C, user_id: i64, range: &DayRange) -> Vec<ResolvedMeal>
where
    C: HealthLogClient + ?Sized,
{
    let meals = recover(client.list_meals(user_id).await, Vec::new(), "meals");
    resolve_meals(client, filter_range(meals, range)).await
}

async fn window_exercises<C>(client: &C, user_id: i64, range: &DayRange) -> Vec<UserExercise>
where
    C: HealthLogClient + ?Sized,
{
    let all = recover(client.list_user_exercises().await, Vec::new(), "exercises");
    filter_user_exercises(all, user_id, range)
}

async fn window_weigh_ins<C>(client: &C, user_id: i64, range: &DayRange) -> Vec<WeighIn>
where
    C: HealthLogClient + ?Sized,
{
    let all = recover(client.list_weigh_ins(user_id).await, Vec::new(), "weigh_ins");
    filter_range(all, range)
}

/// Build the snapshot for the 7 days ending `today`.
///
/// Every fetch has its own neutral fallback, so a failure anywhere only
/// zeroes the part it feeds; when everything fails the result is all zeros.
pub async fn build_snapshot<C>(client: &C, session: &Session, today: NaiveDate) -> DashboardSnapshot
where
    C: HealthLogClient + ?Sized,
{
    let user_id = session.user_id();
    let range = window_range(today);
    let (meals, exercises, weigh_ins) = tokio::join!(
        window_meals(client, user_id, &range),
        window_exercises(client, user_id, &range),
        window_weigh_ins(client, user_id, &range),
    );
    debug!(
        user_id,
        meals = meals.len(),
        exercises = exercises.len(),
        weigh_ins = weigh_ins.len(),
        "loaded dashboard window"
    );

    let today_key = today.to_day_key();
    let calories_in: f64 = meals
        .iter()
        .filter(|m| m.day_key() == today_key)
        .map(|m| m.calories)
        .sum();
    let calories_out: f64 = exercises
        .iter()
        .filter(|e| e.day_key() == today_key)
        .map(UserExercise::calories)
        .sum();
    let latest = weigh_ins
        .iter()
        .max_by_key(|w| w.day_key())
        .map_or(0.0, |w| w.weight);

    let keys: Vec<String> = window_dates(today).iter().map(|d| d.to_day_key()).collect();
    DashboardSnapshot {
        calories_in: calories_in.round() as i64,
        calories_out: calories_out.round() as i64,
        latest_weigh_in: round1(latest),
        weight_history: weight_series(&keys, &weigh_ins),
        calories_history: net_calorie_series(&keys, &meals, &exercises),
    }
}

/// Profile of the signed-in user; an all-zero profile when it cannot be read.
pub async fn fetch_profile<C>(client: &C) -> UserProfile
where
    C: HealthLogClient + ?Sized,
{
    recover(client.get_profile().await, UserProfile::default(), "profile")
}

pub async fn load_dashboard<C>(client: &C, session: &Session, today: NaiveDate) -> DashboardView
where
    C: HealthLogClient + ?Sized,
{
    let (snapshot, profile) = tokio::join!(
        build_snapshot(client, session, today),
        fetch_profile(client)
    );
    DashboardView::assemble(snapshot, profile, today)
}
