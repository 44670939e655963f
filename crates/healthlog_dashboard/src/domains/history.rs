//! Flattened history rows for an arbitrary date range.
//!
//! Unlike the dashboard, history loads are all-or-nothing per domain: a
//! failed request fails that domain's load so the caller can show an error
//! instead of silently incomplete rows.

use futures_util::future::try_join_all;
use healthlog_client::{
    HealthLogClient, HealthLogError, Meal, MeasurementUnit, UserExercise, WeighIn,
};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use super::range::{DayRange, Dated, filter_range, filter_user_exercises};
use crate::Session;

/// One meal-food line.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct MealHistoryRow {
    pub meal_id: i64,
    /// Identifier used to delete this line.
    pub meal_food_id: i64,
    pub date: String,
    pub meal_type: String,
    pub item: String,
    pub amount: Option<f64>,
    pub unit: Option<MeasurementUnit>,
    pub servings: f64,
    pub kcal: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct ExerciseHistoryRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub kcal: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct WeighInHistoryRow {
    pub weigh_in_id: i64,
    pub date: String,
    pub weight: f64,
    pub notes: Option<String>,
}

async fn meal_rows<C>(client: &C, meal: &Meal) -> Result<Vec<MealHistoryRow>, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let links = client.get_meal_foods(meal.meal_id).await?;
    let date = meal.day_key();
    let date = date.as_str();
    try_join_all(links.into_iter().map(|link| async move {
        let food = client.get_food(link.food_id).await?;
        Ok::<_, HealthLogError>(MealHistoryRow {
            meal_id: meal.meal_id,
            meal_food_id: link.id,
            date: date.to_string(),
            meal_type: meal.meal_type.label().to_string(),
            kcal: (food.calories * link.servings).round() as i64,
            item: food.name,
            amount: food.amount,
            unit: food.unit,
            servings: link.servings,
        })
    }))
    .await
}

/// One row per meal-food line of every meal in `range`.
pub async fn meal_history<C>(
    client: &C,
    session: &Session,
    range: &DayRange,
) -> Result<Vec<MealHistoryRow>, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let meals = filter_range(client.list_meals(session.user_id()).await?, range);
    let per_meal = try_join_all(meals.iter().map(|meal| meal_rows(client, meal))).await?;
    let rows: Vec<MealHistoryRow> = per_meal.into_iter().flatten().collect();
    debug!(meals = meals.len(), rows = rows.len(), ?range, "loaded meal history");
    Ok(rows)
}

/// Human-readable amount of a logged exercise.
pub fn format_exercise_amount(entry: &UserExercise) -> String {
    let positive = |v: Option<u32>| v.filter(|n| *n > 0);
    match (
        entry.duration_minutes.filter(|d| *d > 0.0),
        positive(entry.reps),
        positive(entry.sets),
    ) {
        (Some(minutes), _, _) => format!("{minutes} min"),
        (None, Some(reps), Some(sets)) => format!("{sets} sets × {reps} reps"),
        (None, Some(reps), None) => format!("{reps} reps"),
        _ => "N/A".to_string(),
    }
}

pub fn exercise_row(entry: &UserExercise) -> ExerciseHistoryRow {
    ExerciseHistoryRow {
        id: entry.id,
        date: entry.day_key(),
        kind: entry
            .exercise_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        amount: format_exercise_amount(entry),
        kcal: entry.calories().round() as i64,
    }
}

pub async fn exercise_history<C>(
    client: &C,
    session: &Session,
    range: &DayRange,
) -> Result<Vec<ExerciseHistoryRow>, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let entries = filter_user_exercises(client.list_user_exercises().await?, session.user_id(), range);
    Ok(entries.iter().map(exercise_row).collect())
}

/// Weigh-ins in `range`, most recent day first.
pub async fn weigh_in_history<C>(
    client: &C,
    session: &Session,
    range: &DayRange,
) -> Result<Vec<WeighInHistoryRow>, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let weigh_ins = filter_range(client.list_weigh_ins(session.user_id()).await?, range);
    Ok(weigh_in_rows(weigh_ins))
}

pub fn weigh_in_rows(weigh_ins: Vec<WeighIn>) -> Vec<WeighInHistoryRow> {
    let mut rows: Vec<WeighInHistoryRow> = weigh_ins
        .into_iter()
        .map(|w| WeighInHistoryRow {
            weigh_in_id: w.weigh_in_id,
            date: w.day_key(),
            weight: w.weight,
            notes: w.notes,
        })
        .collect();
    // Stable, so same-day readings keep server order.
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryClient;
    use healthlog_client::{ExerciseIntensity, MealType};

    fn session() -> Session {
        Session::new(7).unwrap()
    }

    fn range() -> DayRange {
        DayRange::new("2025-11-01", "2025-11-30")
    }

    fn entry(duration: Option<f64>, reps: Option<u32>, sets: Option<u32>) -> UserExercise {
        UserExercise {
            id: 1,
            user_id: 7,
            exercise_id: 3,
            exercise_name: Some("Push-up".into()),
            date: "2025-11-11T07:00:00".into(),
            duration_minutes: duration,
            reps,
            sets,
            intensity: ExerciseIntensity::Moderate,
            calories_burned: Some(42.6),
            complete: true,
        }
    }

    #[test]
    fn exercise_amount_formats() {
        assert_eq!(format_exercise_amount(&entry(Some(30.0), Some(5), Some(2))), "30 min");
        assert_eq!(format_exercise_amount(&entry(Some(22.5), None, None)), "22.5 min");
        assert_eq!(format_exercise_amount(&entry(None, Some(12), Some(3))), "3 sets × 12 reps");
        assert_eq!(format_exercise_amount(&entry(None, Some(12), None)), "12 reps");
        assert_eq!(format_exercise_amount(&entry(None, None, Some(3))), "N/A");
        assert_eq!(format_exercise_amount(&entry(None, None, None)), "N/A");
    }

    #[test]
    fn exercise_row_defaults() {
        let mut e = entry(Some(10.0), None, None);
        e.exercise_name = None;
        e.calories_burned = None;
        let row = exercise_row(&e);
        assert_eq!(row.kind, "Unknown");
        assert_eq!(row.kcal, 0);
        assert_eq!(row.date, "2025-11-11");
        assert_eq!(exercise_row(&entry(Some(10.0), None, None)).kcal, 43);
    }

    #[test]
    fn weigh_ins_sort_most_recent_first() {
        let w = |id, date: &str| WeighIn {
            weigh_in_id: id,
            user_id: 7,
            date: date.into(),
            weight: 180.0,
            height: None,
            notes: None,
        };
        let rows = weigh_in_rows(vec![
            w(1, "2025-11-02"),
            w(2, "2025-11-09T06:00:00"),
            w(3, "2025-11-05"),
        ]);
        let ids: Vec<i64> = rows.iter().map(|r| r.weigh_in_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn meal_history_flattens_one_row_per_line() {
        let client = InMemoryClient::new();
        client.add_food(1, "Rice", 200.0);
        client.add_food(2, "Beans", 110.0);
        client.add_meal(10, 7, MealType::Dinner, "2025-11-03");
        client.add_link(100, 10, 1, 1.5);
        client.add_link(101, 10, 2, 1.0);
        client.add_meal(11, 7, MealType::Snack, "2025-11-04");
        client.add_meal(12, 7, MealType::Lunch, "2025-10-03");
        client.add_link(102, 12, 1, 1.0);

        let rows = meal_history(&client, &session(), &range()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].meal_food_id, 100);
        assert_eq!(rows[0].meal_type, "Dinner");
        assert_eq!(rows[0].kcal, 300);
        assert_eq!(rows[1].item, "Beans");
    }

    #[tokio::test]
    async fn meal_history_fails_as_a_whole() {
        let client = InMemoryClient::new();
        client.add_food(1, "Rice", 200.0);
        client.add_meal(10, 7, MealType::Dinner, "2025-11-03");
        client.add_link(100, 10, 1, 1.0);
        client.fail_food(1);
        assert!(meal_history(&client, &session(), &range()).await.is_err());
    }

    #[tokio::test]
    async fn exercise_history_is_user_scoped() {
        let client = InMemoryClient::new();
        client.add_exercise(1, 7, "2025-11-02", Some(100.0));
        client.add_exercise(2, 9, "2025-11-02", Some(100.0));
        let rows = exercise_history(&client, &session(), &range()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }
}
