//! Create compositions for meals, exercises and weigh-ins.
//!
//! Input is validated before the first request. Multi-step creates are not
//! transactional: when some food lines of a new meal fail, the meal stays
//! and the error says how many lines are missing.

use futures_util::future::{join_all, try_join_all};
use healthlog_client::{
    ExerciseIntensity, Food, HealthLogClient, HealthLogError, Meal, MealFood, MealType,
    MeasurementSystem, MeasurementUnit, NewFood, NewMeal, NewMealFood, NewUserExercise,
    NewWeighIn, ToDayKey, UserExercise, WeighIn,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{DashboardError, DashboardResult, Session};

/// One food line of a meal being logged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FoodLine {
    pub name: String,
    /// Calories per serving unit.
    pub calories: f64,
    pub amount: f64,
    pub unit: MeasurementUnit,
    pub servings: f64,
}

impl FoodLine {
    fn validate(&self, index: usize) -> DashboardResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if self.name.trim().is_empty() {
            return Err(DashboardError::Validation(format!(
                "food line {} has no name",
                index + 1
            )));
        }
        if !positive(self.calories) || !positive(self.amount) || !positive(self.servings) {
            return Err(DashboardError::Validation(format!(
                "food line {} ({}) needs positive calories, amount and servings",
                index + 1,
                self.name.trim()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct LoggedMeal {
    pub meal: Meal,
    pub links: Vec<MealFood>,
}

/// Reuse the food whose name matches `line.name` ignoring case, or create it.
pub async fn resolve_or_create_food<C>(client: &C, line: &FoodLine) -> Result<Food, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let name = line.name.trim();
    let wanted = name.to_lowercase();
    let candidates = client.search_foods(name).await?;
    if let Some(found) = candidates
        .into_iter()
        .find(|f| f.name.to_lowercase() == wanted)
    {
        return Ok(found);
    }
    client
        .create_food(&NewFood {
            name: name.to_string(),
            calories: line.calories,
            amount: line.amount,
            unit: line.unit,
            servings: line.servings,
        })
        .await
}

async fn link_line<C>(client: &C, meal_id: i64, line: &FoodLine) -> Result<MealFood, HealthLogError>
where
    C: HealthLogClient + ?Sized,
{
    let food = resolve_or_create_food(client, line).await?;
    client
        .create_meal_food(&NewMealFood {
            meal_id,
            food_id: food.id,
            servings: line.servings,
        })
        .await
}

/// Create a meal and link every food line to it.
pub async fn log_meal<C>(
    client: &C,
    session: &Session,
    meal_type: MealType,
    date: impl ToDayKey,
    lines: &[FoodLine],
) -> DashboardResult<LoggedMeal>
where
    C: HealthLogClient + ?Sized,
{
    if lines.is_empty() {
        return Err(DashboardError::Validation(
            "a meal needs at least one food line".into(),
        ));
    }
    for (index, line) in lines.iter().enumerate() {
        line.validate(index)?;
    }

    let meal = client
        .create_meal(&NewMeal {
            user_id: session.user_id(),
            meal_type,
            date: date.to_day_key(),
        })
        .await
        .map_err(|e| DashboardError::mutation("meal", e))?;

    let results = join_all(lines.iter().map(|line| link_line(client, meal.meal_id, line))).await;
    let total = results.len();
    let mut links = Vec::with_capacity(total);
    for (line, result) in lines.iter().zip(results) {
        match result {
            Ok(link) => links.push(link),
            Err(e) => warn!(meal_id = meal.meal_id, food = %line.name, error = %e, "food line not saved"),
        }
    }
    if links.len() < total {
        return Err(DashboardError::PartialMutation {
            meal_id: meal.meal_id,
            failed: total - links.len(),
            total,
        });
    }
    info!(meal_id = meal.meal_id, lines = total, "meal logged");
    Ok(LoggedMeal { meal, links })
}

/// One exercise row; either a duration or reps and sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExerciseEntry {
    pub exercise_id: i64,
    pub duration_minutes: Option<f64>,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub intensity: ExerciseIntensity,
}

impl ExerciseEntry {
    fn to_new(&self, user_id: i64, date: &str) -> NewUserExercise {
        NewUserExercise {
            user_id,
            exercise_id: self.exercise_id,
            date: date.to_string(),
            duration_minutes: self.duration_minutes.filter(|d| *d > 0.0),
            reps: self.reps.filter(|r| *r > 0),
            sets: self.sets.filter(|s| *s > 0),
            intensity: self.intensity,
            // computed by the server
            calories_burned: None,
            complete: true,
        }
    }
}

/// Log a batch of exercises for one day. Nothing is sent unless every row is valid.
pub async fn log_exercises<C>(
    client: &C,
    session: &Session,
    date: impl ToDayKey,
    entries: &[ExerciseEntry],
) -> DashboardResult<Vec<UserExercise>>
where
    C: HealthLogClient + ?Sized,
{
    if entries.is_empty() {
        return Err(DashboardError::Validation(
            "at least one exercise is required".into(),
        ));
    }
    let date = date.to_day_key();
    let rows: Vec<NewUserExercise> = entries
        .iter()
        .map(|e| e.to_new(session.user_id(), &date))
        .collect();
    for row in &rows {
        row.validate()
            .map_err(|e| DashboardError::Validation(e.to_string()))?;
    }

    let created = try_join_all(rows.iter().map(|row| client.create_user_exercise(row)))
        .await
        .map_err(|e| DashboardError::mutation("exercise", e))?;
    info!(count = created.len(), %date, "exercises logged");
    Ok(created)
}

pub async fn log_weigh_in<C>(
    client: &C,
    session: &Session,
    date: impl ToDayKey,
    weight: f64,
    notes: Option<&str>,
) -> DashboardResult<WeighIn>
where
    C: HealthLogClient + ?Sized,
{
    let new = NewWeighIn {
        user_id: session.user_id(),
        date: date.to_day_key(),
        weight,
        height: None,
        notes: notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        measurement: Some(MeasurementSystem::Imperial),
    };
    new.validate()
        .map_err(|e| DashboardError::Validation(e.to_string()))?;
    client
        .create_weigh_in(&new)
        .await
        .map_err(|e| DashboardError::mutation("weigh-in", e))
}
