//! Goal-progress metrics derived from a snapshot and the user profile.

use healthlog_client::UserProfile;
use schemars::JsonSchema;
use serde::Serialize;

use super::dashboard::DashboardSnapshot;
use super::round1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct ProgressSummary {
    pub net_calories: i64,
    pub weight_change: f64,
    pub goal_progress_percent: u8,
    pub remaining_weight: f64,
    pub days_active: usize,
}

impl ProgressSummary {
    pub fn compute(snapshot: &DashboardSnapshot, profile: &UserProfile) -> Self {
        let initial = profile.effective_initial_weight();
        let goal = profile.effective_goal_weight();
        let current = snapshot.latest_weigh_in;
        Self {
            net_calories: net_calories(snapshot.calories_in, snapshot.calories_out),
            weight_change: weight_change(&snapshot.weight_history, initial),
            goal_progress_percent: goal_progress(initial, goal, current),
            remaining_weight: remaining_weight(initial, goal, current),
            days_active: days_active(&snapshot.weight_history),
        }
    }
}

pub fn net_calories(calories_in: i64, calories_out: i64) -> i64 {
    calories_in - calories_out
}

/// Change across the recorded (non-zero) entries of the weight series.
///
/// A single reading is compared to the initial weight, when one is known.
pub fn weight_change(history: &[f64], initial: f64) -> f64 {
    let readings: Vec<f64> = history.iter().copied().filter(|w| *w > 0.0).collect();
    match readings.as_slice() {
        [] => 0.0,
        [only] if initial > 0.0 => round1(only - initial),
        [_] => 0.0,
        [first, .., last] => round1(last - first),
    }
}

/// Share of the initial → goal distance already covered, clamped to 0..=100.
pub fn goal_progress(initial: f64, goal: f64, current: f64) -> u8 {
    if initial == 0.0 || goal == 0.0 || initial == goal || current == 0.0 {
        return 0;
    }
    let progress = ((initial - current) / (initial - goal) * 100.0).round();
    progress.clamp(0.0, 100.0) as u8
}

pub fn remaining_weight(initial: f64, goal: f64, current: f64) -> f64 {
    let from = if current == 0.0 { initial } else { current };
    round1(from - goal).max(0.0)
}

pub fn days_active(history: &[f64]) -> usize {
    history.iter().filter(|w| **w > 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_progress_cases() {
        assert_eq!(goal_progress(200.0, 180.0, 190.0), 50);
        assert_eq!(goal_progress(180.0, 180.0, 175.0), 0);
        assert_eq!(goal_progress(200.0, 180.0, 0.0), 0);
        assert_eq!(goal_progress(0.0, 180.0, 190.0), 0);
        assert_eq!(goal_progress(200.0, 180.0, 170.0), 100);
        assert_eq!(goal_progress(200.0, 180.0, 210.0), 0);
    }

    #[test]
    fn goal_progress_works_for_weight_gain_goals() {
        assert_eq!(goal_progress(150.0, 170.0, 160.0), 50);
    }

    #[test]
    fn remaining_weight_cases() {
        assert_eq!(remaining_weight(200.0, 180.0, 0.0), 20.0);
        assert_eq!(remaining_weight(200.0, 180.0, 190.0), 10.0);
        assert_eq!(remaining_weight(200.0, 180.0, 179.0), 0.0);
    }

    #[test]
    fn weight_change_cases() {
        assert_eq!(weight_change(&[0.0; 7], 200.0), 0.0);
        assert_eq!(weight_change(&[0.0, 0.0, 195.5], 200.0), -4.5);
        assert_eq!(weight_change(&[195.5], 0.0), 0.0);
        assert_eq!(weight_change(&[0.0, 190.0, 190.0, 188.7], 200.0), -1.3);
    }

    #[test]
    fn days_active_counts_recorded_days() {
        assert_eq!(days_active(&[0.0, 0.0, 181.0, 181.0, 180.5]), 3);
    }

    #[test]
    fn compute_combines_snapshot_and_profile() {
        let snapshot = DashboardSnapshot {
            calories_in: 1800,
            calories_out: 400,
            latest_weigh_in: 190.0,
            weight_history: vec![0.0, 0.0, 0.0, 0.0, 0.0, 191.0, 190.0],
            ..DashboardSnapshot::default()
        };
        let profile = UserProfile {
            initial_weight: Some(200.0),
            goal_weight: Some(180.0),
            ..UserProfile::default()
        };
        let summary = ProgressSummary::compute(&snapshot, &profile);
        assert_eq!(summary.net_calories, 1400);
        assert_eq!(summary.weight_change, -1.0);
        assert_eq!(summary.goal_progress_percent, 50);
        assert_eq!(summary.remaining_weight, 10.0);
        assert_eq!(summary.days_active, 2);
    }
}
