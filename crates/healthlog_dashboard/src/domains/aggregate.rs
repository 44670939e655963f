//! Projection of sparse, irregularly dated records onto a dense 7-day axis.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use healthlog_client::{ToDayKey, UserExercise, WeighIn};

use super::meals::ResolvedMeal;
use super::range::{DayRange, Dated};

pub const WINDOW_DAYS: usize = 7;

/// `today - 6 ..= today`, oldest first.
pub fn window_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..WINDOW_DAYS as u64)
        .rev()
        .map(|back| today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN))
        .collect()
}

pub fn window_keys(today: NaiveDate) -> Vec<String> {
    window_dates(today).iter().map(|d| d.to_day_key()).collect()
}

pub fn window_range(today: NaiveDate) -> DayRange {
    DayRange::ending_on(today, WINDOW_DAYS as u64)
}

/// Last-known weight per day.
///
/// Days before the first reading are 0. When a day has several readings the
/// last one in input order wins.
pub fn weight_series(keys: &[String], weigh_ins: &[WeighIn]) -> Vec<f64> {
    let by_day: HashMap<String, f64> = weigh_ins
        .iter()
        .map(|w| (w.day_key(), w.weight))
        .collect();

    let mut carry = 0.0;
    keys.iter()
        .map(|key| {
            if let Some(weight) = by_day.get(key) {
                carry = *weight;
            }
            carry
        })
        .collect()
}

/// Calories in and out for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DayCalories {
    pub calories_in: f64,
    pub calories_out: f64,
}

impl DayCalories {
    pub fn net(&self) -> f64 {
        self.calories_in - self.calories_out
    }
}

/// Per-day calorie buckets; records outside `keys` are ignored and nothing carries over.
pub fn daily_calories(
    keys: &[String],
    meals: &[ResolvedMeal],
    exercises: &[UserExercise],
) -> Vec<DayCalories> {
    let mut buckets: HashMap<&str, DayCalories> = keys
        .iter()
        .map(|k| (k.as_str(), DayCalories::default()))
        .collect();

    for meal in meals {
        if let Some(day) = buckets.get_mut(meal.day_key().as_str()) {
            day.calories_in += meal.calories;
        }
    }
    for exercise in exercises {
        if let Some(day) = buckets.get_mut(exercise.day_key().as_str()) {
            day.calories_out += exercise.calories();
        }
    }

    keys.iter()
        .map(|k| buckets.get(k.as_str()).copied().unwrap_or_default())
        .collect()
}

/// Net calories (in − out) per day; may be negative.
pub fn net_calorie_series(
    keys: &[String],
    meals: &[ResolvedMeal],
    exercises: &[UserExercise],
) -> Vec<f64> {
    daily_calories(keys, meals, exercises)
        .iter()
        .map(DayCalories::net)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthlog_client::{ExerciseIntensity, MealType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 7).unwrap()
    }

    fn weigh_in(date: &str, weight: f64) -> WeighIn {
        WeighIn {
            weigh_in_id: 0,
            user_id: 1,
            date: date.into(),
            weight,
            height: None,
            notes: None,
        }
    }

    fn meal(date: &str, calories: f64) -> ResolvedMeal {
        ResolvedMeal {
            meal_id: 0,
            meal_type: MealType::Dinner,
            date: date.into(),
            calories,
        }
    }

    fn burn(date: &str, calories: Option<f64>) -> UserExercise {
        UserExercise {
            id: 0,
            user_id: 1,
            exercise_id: 1,
            exercise_name: None,
            date: date.into(),
            duration_minutes: Some(30.0),
            reps: None,
            sets: None,
            intensity: ExerciseIntensity::Moderate,
            calories_burned: calories,
            complete: true,
        }
    }

    #[test]
    fn window_is_seven_days_oldest_first() {
        let keys = window_keys(today());
        assert_eq!(keys.len(), WINDOW_DAYS);
        assert_eq!(keys.first().unwrap(), "2025-11-01");
        assert_eq!(keys.last().unwrap(), "2025-11-07");
        assert_eq!(window_range(today()), DayRange::new("2025-11-01", "2025-11-07"));
    }

    #[test]
    fn weight_is_carried_forward() {
        let keys = window_keys(today());
        let series = weight_series(
            &keys,
            &[weigh_in("2025-11-01", 180.0), weigh_in("2025-11-06T07:30:00", 178.4)],
        );
        assert_eq!(series, vec![180.0, 180.0, 180.0, 180.0, 180.0, 178.4, 178.4]);
    }

    #[test]
    fn days_before_first_reading_are_zero() {
        let keys = window_keys(today());
        let series = weight_series(&keys, &[weigh_in("2025-11-04", 181.0)]);
        assert_eq!(series, vec![0.0, 0.0, 0.0, 181.0, 181.0, 181.0, 181.0]);
        assert_eq!(weight_series(&keys, &[]), vec![0.0; WINDOW_DAYS]);
    }

    #[test]
    fn net_calories_bucket_per_day_without_carry() {
        let keys = window_keys(today());
        let series = net_calorie_series(
            &keys,
            &[
                meal("2025-11-02", 500.0),
                meal("2025-11-02T19:00:00", 700.0),
                meal("2025-11-07", 300.0),
                meal("2025-10-30", 999.0),
            ],
            &[burn("2025-11-07", Some(450.0)), burn("2025-11-03", None)],
        );
        assert_eq!(series, vec![0.0, 1200.0, 0.0, 0.0, 0.0, 0.0, -150.0]);
    }

    #[test]
    fn empty_day_is_exactly_zero() {
        let keys = window_keys(today());
        let series = net_calorie_series(&keys, &[], &[]);
        assert!(series.iter().all(|v| *v == 0.0));
    }
}
