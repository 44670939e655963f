use chrono::{Days, NaiveDate};
use healthlog_client::{Meal, ToDayKey, UserExercise, WeighIn, day_key};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Inclusive range of day-keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DayRange {
    pub start: String,
    pub end: String,
}

impl DayRange {
    /// Both bounds are normalized, so timestamps are accepted.
    pub fn new(start: impl ToDayKey, end: impl ToDayKey) -> Self {
        Self {
            start: start.to_day_key(),
            end: end.to_day_key(),
        }
    }

    /// The `days` calendar days ending with (and including) `last`.
    pub fn ending_on(last: NaiveDate, days: u64) -> Self {
        let first = last
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(first, last)
    }

    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.start.as_str() <= key && key <= self.end.as_str()
    }
}

/// A record carrying a raw date that can be reduced to a day-key.
pub trait Dated {
    fn raw_date(&self) -> &str;

    fn day_key(&self) -> String {
        day_key(self.raw_date())
    }
}

impl Dated for Meal {
    fn raw_date(&self) -> &str {
        &self.date
    }
}

impl Dated for UserExercise {
    fn raw_date(&self) -> &str {
        &self.date
    }
}

impl Dated for WeighIn {
    fn raw_date(&self) -> &str {
        &self.date
    }
}

/// Keep the items whose day-key lies inside `range`.
pub fn filter_range<T: Dated>(items: Vec<T>, range: &DayRange) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| range.contains(&item.day_key()))
        .collect()
}

/// Logged exercises come back for every user; keep the session user's rows in `range`.
pub fn filter_user_exercises(
    items: Vec<UserExercise>,
    user_id: i64,
    range: &DayRange,
) -> Vec<UserExercise> {
    items
        .into_iter()
        .filter(|e| e.user_id == user_id && range.contains(&e.day_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthlog_client::ExerciseIntensity;

    fn weigh_in(id: i64, date: &str) -> WeighIn {
        WeighIn {
            weigh_in_id: id,
            user_id: 1,
            date: date.into(),
            weight: 180.0,
            height: None,
            notes: None,
        }
    }

    fn exercise(id: i64, user_id: i64, date: &str) -> UserExercise {
        UserExercise {
            id,
            user_id,
            exercise_id: 1,
            exercise_name: None,
            date: date.into(),
            duration_minutes: Some(20.0),
            reps: None,
            sets: None,
            intensity: ExerciseIntensity::Light,
            calories_burned: Some(100.0),
            complete: true,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = DayRange::new("2025-11-01", "2025-11-07");
        let items = vec![
            weigh_in(1, "2025-10-31"),
            weigh_in(2, "2025-11-01T06:00:00"),
            weigh_in(3, "2025-11-07"),
            weigh_in(4, "2025-11-08"),
        ];
        let ids: Vec<i64> = filter_range(items, &range)
            .iter()
            .map(|w| w.weigh_in_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let range = DayRange::new("2025-11-01", "2025-11-07");
        assert!(filter_range(Vec::<WeighIn>::new(), &range).is_empty());
        let inverted = DayRange::new("2025-11-07", "2025-11-01");
        assert!(filter_range(vec![weigh_in(1, "2025-11-03")], &inverted).is_empty());
    }

    #[test]
    fn exercises_are_scoped_to_the_user() {
        let range = DayRange::new("2025-11-01", "2025-11-07");
        let rows = filter_user_exercises(
            vec![exercise(1, 7, "2025-11-02"), exercise(2, 8, "2025-11-02")],
            7,
            &range,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn ending_on_spans_requested_days() {
        let last = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let range = DayRange::ending_on(last, 7);
        assert_eq!(range.start, "2025-02-24");
        assert_eq!(range.end, "2025-03-02");
    }

    #[test]
    fn unparseable_dates_never_match() {
        let range = DayRange::new("2025-11-01", "2025-11-07");
        assert!(!range.contains(""));
    }
}
