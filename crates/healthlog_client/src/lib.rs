//! `HealthLogClient` trait, resource DTOs and a reqwest-based implementation.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod utils;

pub use utils::{ToDayKey, day_key};

#[derive(Debug, Error)]
pub enum HealthLogError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
}

impl HealthLogError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound(body),
            401 | 403 => Self::Auth(body),
            400 | 422 => Self::InvalidInput(body),
            _ => Self::Api { status, body },
        }
    }

    /// Authentication failures have no neutral fallback; everything else is
    /// treated as a transient fetch failure by aggregating callers.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementUnit {
    OunceWeight,
    Pound,
    Gram,
    Kilogram,
    OunceVol,
    Teaspoon,
    Tablespoon,
    Cup,
    Milliliter,
    Liter,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementSystem {
    Metric,
    Imperial,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseIntensity {
    Light,
    Moderate,
    Vigorous,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub meal_id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub date: String, // YYYY-MM-DD or ISO timestamp
}

/// Join row linking one meal to one food.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealFood {
    pub id: i64,
    pub meal_id: i64,
    pub food_id: i64,
    pub servings: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
    /// Calories per serving unit.
    pub calories: f64,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<MeasurementUnit>,
    #[serde(default)]
    pub servings: Option<f64>,
}

/// Catalog entry; immutable reference data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserExercise {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    #[serde(default)]
    pub exercise_name: Option<String>,
    pub date: String,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub sets: Option<u32>,
    pub intensity: ExerciseIntensity,
    #[serde(default)]
    pub calories_burned: Option<f64>,
    #[serde(default)]
    pub complete: bool,
}

impl UserExercise {
    /// Calories burned as reported by the server; absent counts as zero.
    pub fn calories(&self) -> f64 {
        self.calories_burned.unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeighIn {
    pub weigh_in_id: i64,
    pub user_id: i64,
    pub date: String,
    pub weight: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Profile of the signed-in user as returned by `/api/profile/me`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub initial_weight: Option<f64>,
    #[serde(default, rename = "weight")]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub goal_weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl UserProfile {
    /// Initial weight, falling back to the current profile weight, then 0.
    pub fn effective_initial_weight(&self) -> f64 {
        self.initial_weight
            .filter(|w| *w > 0.0)
            .or(self.current_weight.filter(|w| *w > 0.0))
            .unwrap_or(0.0)
    }

    pub fn effective_goal_weight(&self) -> f64 {
        self.goal_weight.unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFood {
    pub name: String,
    pub calories: f64,
    pub amount: f64,
    pub unit: MeasurementUnit,
    pub servings: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMealFood {
    pub meal_id: i64,
    pub food_id: i64,
    pub servings: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserExercise {
    pub user_id: i64,
    pub exercise_id: i64,
    pub date: String,
    pub duration_minutes: Option<f64>,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub intensity: ExerciseIntensity,
    pub calories_burned: Option<f64>,
    pub complete: bool,
}

impl NewUserExercise {
    /// An entry needs either a positive duration or positive reps and sets.
    pub fn validate(&self) -> Result<(), HealthLogError> {
        let has_duration = self.duration_minutes.is_some_and(|d| d > 0.0);
        let has_reps_and_sets =
            self.reps.is_some_and(|r| r > 0) && self.sets.is_some_and(|s| s > 0);
        if has_duration || has_reps_and_sets {
            Ok(())
        } else {
            Err(HealthLogError::InvalidInput(format!(
                "exercise {} needs either duration (minutes) or reps and sets",
                self.exercise_id
            )))
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewWeighIn {
    pub user_id: i64,
    pub date: String,
    pub weight: f64,
    pub height: Option<f64>,
    pub notes: Option<String>,
    pub measurement: Option<MeasurementSystem>,
}

impl NewWeighIn {
    pub fn validate(&self) -> Result<(), HealthLogError> {
        if self.weight.is_finite() && self.weight > 0.0 {
            Ok(())
        } else {
            Err(HealthLogError::InvalidInput(format!(
                "weight must be greater than 0, got {}",
                self.weight
            )))
        }
    }
}

#[async_trait]
pub trait HealthLogClient: Send + Sync + 'static {
    // === Meals ===

    /// List every meal logged by a user.
    async fn list_meals(&self, user_id: i64) -> Result<Vec<Meal>, HealthLogError>;
    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, HealthLogError>;

    // === Meal-food links ===

    async fn get_meal_foods(&self, meal_id: i64) -> Result<Vec<MealFood>, HealthLogError>;
    async fn create_meal_food(&self, link: &NewMealFood) -> Result<MealFood, HealthLogError>;
    /// Remove exactly one meal-food line.
    async fn delete_meal_food(&self, meal_food_id: i64) -> Result<(), HealthLogError>;

    // === Foods ===

    async fn get_food(&self, food_id: i64) -> Result<Food, HealthLogError>;
    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, HealthLogError>;
    async fn create_food(&self, food: &NewFood) -> Result<Food, HealthLogError>;

    // === Exercise catalog ===

    async fn list_exercises(&self) -> Result<Vec<Exercise>, HealthLogError>;
    async fn search_exercises(&self, name: &str) -> Result<Vec<Exercise>, HealthLogError>;

    // === Logged exercises ===

    /// List logged exercises for all users; callers filter by user id.
    async fn list_user_exercises(&self) -> Result<Vec<UserExercise>, HealthLogError>;
    async fn create_user_exercise(
        &self,
        entry: &NewUserExercise,
    ) -> Result<UserExercise, HealthLogError>;
    async fn delete_user_exercise(&self, id: i64) -> Result<(), HealthLogError>;

    // === Weigh-ins ===

    async fn list_weigh_ins(&self, user_id: i64) -> Result<Vec<WeighIn>, HealthLogError>;
    async fn create_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, HealthLogError>;
    async fn delete_weigh_in(&self, weigh_in_id: i64) -> Result<(), HealthLogError>;

    // === Profile ===

    async fn get_profile(&self) -> Result<UserProfile, HealthLogError>;
}
