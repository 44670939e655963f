//! Middleware layer for cross-cutting concerns.
//!
//! Sits between the view logic and the API client so every request is
//! traced in one place, whatever client implementation is underneath.

use std::sync::Arc;
use std::time::Instant;

use healthlog_client::{
    Exercise, Food, HealthLogClient, HealthLogError, Meal, MealFood, NewFood, NewMeal,
    NewMealFood, NewUserExercise, NewWeighIn, UserExercise, UserProfile, WeighIn,
};
use tracing::debug;

/// Wraps a [`HealthLogClient`] and logs start, outcome and duration of every call.
#[derive(Clone)]
pub struct LoggingMiddleware<C: HealthLogClient> {
    inner: Arc<C>,
}

impl<C: HealthLogClient> LoggingMiddleware<C> {
    /// Create a new logging middleware wrapper.
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Execute a fallible operation with logging.
    async fn with_logging<F, Fut, T>(&self, operation: F, name: &str) -> Result<T, HealthLogError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<T, HealthLogError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => {
                debug!(
                    "Operation completed successfully: {} in {:?}",
                    name, duration
                );
            }
            Err(e) => {
                debug!(
                    "Operation failed: {} in {:?} - error: {}",
                    name, duration, e
                );
            }
        }

        result
    }
}

#[async_trait::async_trait]
impl<C: HealthLogClient + 'static> HealthLogClient for LoggingMiddleware<C> {
    async fn list_meals(&self, user_id: i64) -> Result<Vec<Meal>, HealthLogError> {
        self.with_logging(
            |client| async move { client.list_meals(user_id).await },
            &format!("list_meals(user {})", user_id),
        )
        .await
    }

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, HealthLogError> {
        self.with_logging(
            |client| async move { client.create_meal(meal).await },
            "create_meal",
        )
        .await
    }

    async fn get_meal_foods(&self, meal_id: i64) -> Result<Vec<MealFood>, HealthLogError> {
        self.with_logging(
            |client| async move { client.get_meal_foods(meal_id).await },
            &format!("get_meal_foods(meal {})", meal_id),
        )
        .await
    }

    async fn create_meal_food(&self, link: &NewMealFood) -> Result<MealFood, HealthLogError> {
        self.with_logging(
            |client| async move { client.create_meal_food(link).await },
            "create_meal_food",
        )
        .await
    }

    async fn delete_meal_food(&self, meal_food_id: i64) -> Result<(), HealthLogError> {
        self.with_logging(
            |client| async move { client.delete_meal_food(meal_food_id).await },
            &format!("delete_meal_food({})", meal_food_id),
        )
        .await
    }

    async fn get_food(&self, food_id: i64) -> Result<Food, HealthLogError> {
        self.with_logging(
            |client| async move { client.get_food(food_id).await },
            &format!("get_food({})", food_id),
        )
        .await
    }

    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, HealthLogError> {
        self.with_logging(
            |client| async move { client.search_foods(name).await },
            "search_foods",
        )
        .await
    }

    async fn create_food(&self, food: &NewFood) -> Result<Food, HealthLogError> {
        self.with_logging(
            |client| async move { client.create_food(food).await },
            "create_food",
        )
        .await
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, HealthLogError> {
        self.with_logging(
            |client| async move { client.list_exercises().await },
            "list_exercises",
        )
        .await
    }

    async fn search_exercises(&self, name: &str) -> Result<Vec<Exercise>, HealthLogError> {
        self.with_logging(
            |client| async move { client.search_exercises(name).await },
            "search_exercises",
        )
        .await
    }

    async fn list_user_exercises(&self) -> Result<Vec<UserExercise>, HealthLogError> {
        self.with_logging(
            |client| async move { client.list_user_exercises().await },
            "list_user_exercises",
        )
        .await
    }

    async fn create_user_exercise(
        &self,
        entry: &NewUserExercise,
    ) -> Result<UserExercise, HealthLogError> {
        self.with_logging(
            |client| async move { client.create_user_exercise(entry).await },
            &format!("create_user_exercise(exercise {})", entry.exercise_id),
        )
        .await
    }

    async fn delete_user_exercise(&self, id: i64) -> Result<(), HealthLogError> {
        self.with_logging(
            |client| async move { client.delete_user_exercise(id).await },
            &format!("delete_user_exercise({})", id),
        )
        .await
    }

    async fn list_weigh_ins(&self, user_id: i64) -> Result<Vec<WeighIn>, HealthLogError> {
        self.with_logging(
            |client| async move { client.list_weigh_ins(user_id).await },
            &format!("list_weigh_ins(user {})", user_id),
        )
        .await
    }

    async fn create_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, HealthLogError> {
        self.with_logging(
            |client| async move { client.create_weigh_in(weigh_in).await },
            "create_weigh_in",
        )
        .await
    }

    async fn delete_weigh_in(&self, weigh_in_id: i64) -> Result<(), HealthLogError> {
        self.with_logging(
            |client| async move { client.delete_weigh_in(weigh_in_id).await },
            &format!("delete_weigh_in({})", weigh_in_id),
        )
        .await
    }

    async fn get_profile(&self) -> Result<UserProfile, HealthLogError> {
        self.with_logging(
            |client| async move { client.get_profile().await },
            "get_profile",
        )
        .await
    }
}
