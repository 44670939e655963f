//! Meal → meal-food → food resolution.
//!
//! Every hop is a separate request. Food lookups for one meal run
//! concurrently and a failed lookup contributes 0 instead of failing the
//! meal; a failed link lookup makes the whole meal 0. No error leaves this
//! module.

use futures_util::future::join_all;
use healthlog_client::{HealthLogClient, Meal, MealType};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use super::range::Dated;
use super::recover;

/// A meal with its resolved calorie total.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct ResolvedMeal {
    pub meal_id: i64,
    pub meal_type: MealType,
    pub date: String,
    pub calories: f64,
}

impl Dated for ResolvedMeal {
    fn raw_date(&self) -> &str {
        &self.date
    }
}

/// Total calories for one meal: the sum of `food.calories × servings` over its links.
pub async fn resolve_meal_calories<C>(client: &C, meal_id: i64) -> f64
where
    C: HealthLogClient + ?Sized,
{
    let links = recover(client.get_meal_foods(meal_id).await, Vec::new(), "meal_links");
    if links.is_empty() {
        return 0.0;
    }

    let lines = join_all(links.iter().map(|link| async move {
        let calories = client
            .get_food(link.food_id)
            .await
            .map(|food| food.calories * link.servings);
        recover(calories, 0.0, "food")
    }))
    .await;

    let total: f64 = lines.iter().sum();
    debug!(meal_id, lines = links.len(), total, "resolved meal calories");
    total
}

pub async fn resolve_meal<C>(client: &C, meal: Meal) -> ResolvedMeal
where
    C: HealthLogClient + ?Sized,
{
    let calories = resolve_meal_calories(client, meal.meal_id).await;
    ResolvedMeal {
        meal_id: meal.meal_id,
        meal_type: meal.meal_type,
        date: meal.date,
        calories,
    }
}

/// Resolve every meal concurrently, keeping input order.
pub async fn resolve_meals<C>(client: &C, meals: Vec<Meal>) -> Vec<ResolvedMeal>
where
    C: HealthLogClient + ?Sized,
{
    join_all(meals.into_iter().map(|meal| resolve_meal(client, meal))).await
}
