//! Shared test utilities: an in-memory `HealthLogClient` with failure injection.
//!
//! Keep this module `#[cfg(test)]`-only.
#![cfg(test)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use healthlog_client::{
    Exercise, ExerciseIntensity, Food, HealthLogClient, HealthLogError, Meal, MealFood, MealType,
    NewFood, NewMeal, NewMealFood, NewUserExercise, NewWeighIn, UserExercise, UserProfile,
    WeighIn,
};
use tokio::sync::Notify;

/// Whole collections that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Meals,
    Exercises,
    WeighIns,
    Profile,
}

/// Holds the next `list_meals` call until released.
#[derive(Clone)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
struct Store {
    meals: Vec<Meal>,
    links: Vec<MealFood>,
    foods: Vec<Food>,
    catalog: Vec<Exercise>,
    exercises: Vec<UserExercise>,
    weigh_ins: Vec<WeighIn>,
    profile: UserProfile,
    failing_foods: HashSet<i64>,
    failing_links: HashSet<i64>,
    denied_foods: HashSet<i64>,
    denied_links: HashSet<i64>,
    failing_searches: HashSet<String>,
    failing_collections: HashSet<Collection>,
    auth_failure: bool,
    writes_fail: bool,
    next_id: i64,
}

pub struct InMemoryClient {
    store: Mutex<Store>,
    requests: AtomicUsize,
    gate: Mutex<Option<Gate>>,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(what: &str) -> HealthLogError {
    HealthLogError::Api {
        status: 503,
        body: format!("{what} unavailable"),
    }
}

impl InMemoryClient {
    pub fn new() -> Self {
        let store = Store {
            catalog: vec![
                Exercise {
                    id: 1,
                    name: "Running".into(),
                },
                Exercise {
                    id: 2,
                    name: "Jump Rope".into(),
                },
            ],
            next_id: 1000,
            ..Store::default()
        };
        Self {
            store: Mutex::new(store),
            requests: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    // === Seeding ===

    pub fn add_meal(&self, meal_id: i64, user_id: i64, meal_type: MealType, date: &str) {
        self.store.lock().unwrap().meals.push(Meal {
            meal_id,
            user_id,
            meal_type,
            date: date.into(),
        });
    }

    pub fn add_food(&self, id: i64, name: &str, calories: f64) {
        self.store.lock().unwrap().foods.push(Food {
            id,
            name: name.into(),
            calories,
            amount: Some(1.0),
            unit: None,
            servings: Some(1.0),
        });
    }

    pub fn add_link(&self, id: i64, meal_id: i64, food_id: i64, servings: f64) {
        self.store.lock().unwrap().links.push(MealFood {
            id,
            meal_id,
            food_id,
            servings,
        });
    }

    pub fn add_exercise(&self, id: i64, user_id: i64, date: &str, calories_burned: Option<f64>) {
        self.store.lock().unwrap().exercises.push(UserExercise {
            id,
            user_id,
            exercise_id: 1,
            exercise_name: Some("Running".into()),
            date: date.into(),
            duration_minutes: Some(30.0),
            reps: None,
            sets: None,
            intensity: ExerciseIntensity::Moderate,
            calories_burned,
            complete: true,
        });
    }

    pub fn add_weigh_in(&self, weigh_in_id: i64, user_id: i64, date: &str, weight: f64) {
        self.store.lock().unwrap().weigh_ins.push(WeighIn {
            weigh_in_id,
            user_id,
            date: date.into(),
            weight,
            height: None,
            notes: None,
        });
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.store.lock().unwrap().profile = profile;
    }

    // === Failure injection ===

    pub fn fail_food(&self, food_id: i64) {
        self.store.lock().unwrap().failing_foods.insert(food_id);
    }

    pub fn fail_meal_links(&self, meal_id: i64) {
        self.store.lock().unwrap().failing_links.insert(meal_id);
    }

    /// Lookups of this food answer 403.
    pub fn deny_food(&self, food_id: i64) {
        self.store.lock().unwrap().denied_foods.insert(food_id);
    }

    /// Link lookups for this meal answer 403.
    pub fn deny_meal_links(&self, meal_id: i64) {
        self.store.lock().unwrap().denied_links.insert(meal_id);
    }

    pub fn fail_food_search(&self, name: &str) {
        self.store
            .lock()
            .unwrap()
            .failing_searches
            .insert(name.to_lowercase());
    }

    pub fn fail_collection(&self, collection: Collection) {
        self.store
            .lock()
            .unwrap()
            .failing_collections
            .insert(collection);
    }

    /// Every call fails with 401.
    pub fn set_auth_failure(&self, on: bool) {
        self.store.lock().unwrap().auth_failure = on;
    }

    /// Every create and delete fails with 500.
    pub fn fail_writes(&self, on: bool) {
        self.store.lock().unwrap().writes_fail = on;
    }

    /// Block the next `list_meals` call until `release` is notified.
    pub fn gate_next_meal_list(&self) -> Gate {
        let gate = Gate {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    // === Inspection ===

    pub fn meals_snapshot(&self) -> Vec<Meal> {
        self.store.lock().unwrap().meals.clone()
    }

    pub fn food_count(&self) -> usize {
        self.store.lock().unwrap().foods.len()
    }

    pub fn meal_food_count(&self) -> usize {
        self.store.lock().unwrap().links.len()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    // === Helpers ===

    fn read(&self, collection: Option<Collection>) -> Result<(), HealthLogError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let store = self.store.lock().unwrap();
        if store.auth_failure {
            return Err(HealthLogError::Auth("token expired".into()));
        }
        match collection {
            Some(c) if store.failing_collections.contains(&c) => Err(unavailable("collection")),
            _ => Ok(()),
        }
    }

    fn write(&self) -> Result<i64, HealthLogError> {
        self.read(None)?;
        let mut store = self.store.lock().unwrap();
        if store.writes_fail {
            return Err(HealthLogError::Api {
                status: 500,
                body: "write rejected".into(),
            });
        }
        store.next_id += 1;
        Ok(store.next_id)
    }
}

#[async_trait]
impl HealthLogClient for InMemoryClient {
    async fn list_meals(&self, user_id: i64) -> Result<Vec<Meal>, HealthLogError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.read(Some(Collection::Meals))?;
        let store = self.store.lock().unwrap();
        Ok(store
            .meals
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, HealthLogError> {
        let meal_id = self.write()?;
        let created = Meal {
            meal_id,
            user_id: meal.user_id,
            meal_type: meal.meal_type,
            date: meal.date.clone(),
        };
        self.store.lock().unwrap().meals.push(created.clone());
        Ok(created)
    }

    async fn get_meal_foods(&self, meal_id: i64) -> Result<Vec<MealFood>, HealthLogError> {
        self.read(None)?;
        let store = self.store.lock().unwrap();
        if store.failing_links.contains(&meal_id) {
            return Err(unavailable("meal-food"));
        }
        if store.denied_links.contains(&meal_id) {
            return Err(HealthLogError::Auth("forbidden".into()));
        }
        Ok(store
            .links
            .iter()
            .filter(|l| l.meal_id == meal_id)
            .cloned()
            .collect())
    }

    async fn create_meal_food(&self, link: &NewMealFood) -> Result<MealFood, HealthLogError> {
        let id = self.write()?;
        let created = MealFood {
            id,
            meal_id: link.meal_id,
            food_id: link.food_id,
            servings: link.servings,
        };
        self.store.lock().unwrap().links.push(created.clone());
        Ok(created)
    }

    async fn delete_meal_food(&self, meal_food_id: i64) -> Result<(), HealthLogError> {
        self.write()?;
        let mut store = self.store.lock().unwrap();
        let before = store.links.len();
        store.links.retain(|l| l.id != meal_food_id);
        if store.links.len() == before {
            return Err(HealthLogError::NotFound(format!("meal-food {meal_food_id}")));
        }
        Ok(())
    }

    async fn get_food(&self, food_id: i64) -> Result<Food, HealthLogError> {
        self.read(None)?;
        let store = self.store.lock().unwrap();
        if store.failing_foods.contains(&food_id) {
            return Err(unavailable("food"));
        }
        if store.denied_foods.contains(&food_id) {
            return Err(HealthLogError::Auth("forbidden".into()));
        }
        store
            .foods
            .iter()
            .find(|f| f.id == food_id)
            .cloned()
            .ok_or_else(|| HealthLogError::NotFound(format!("food {food_id}")))
    }

    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, HealthLogError> {
        self.read(None)?;
        let needle = name.to_lowercase();
        let store = self.store.lock().unwrap();
        if store.failing_searches.contains(&needle) {
            return Err(unavailable("food search"));
        }
        Ok(store
            .foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_food(&self, food: &NewFood) -> Result<Food, HealthLogError> {
        let id = self.write()?;
        let created = Food {
            id,
            name: food.name.clone(),
            calories: food.calories,
            amount: Some(food.amount),
            unit: Some(food.unit),
            servings: Some(food.servings),
        };
        self.store.lock().unwrap().foods.push(created.clone());
        Ok(created)
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, HealthLogError> {
        self.read(None)?;
        Ok(self.store.lock().unwrap().catalog.clone())
    }

    async fn search_exercises(&self, name: &str) -> Result<Vec<Exercise>, HealthLogError> {
        self.read(None)?;
        let needle = name.to_lowercase();
        Ok(self
            .store
            .lock()
            .unwrap()
            .catalog
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_user_exercises(&self) -> Result<Vec<UserExercise>, HealthLogError> {
        self.read(Some(Collection::Exercises))?;
        Ok(self.store.lock().unwrap().exercises.clone())
    }

    async fn create_user_exercise(
        &self,
        entry: &NewUserExercise,
    ) -> Result<UserExercise, HealthLogError> {
        entry.validate()?;
        let id = self.write()?;
        let mut store = self.store.lock().unwrap();
        let exercise_name = store
            .catalog
            .iter()
            .find(|e| e.id == entry.exercise_id)
            .map(|e| e.name.clone());
        let created = UserExercise {
            id,
            user_id: entry.user_id,
            exercise_id: entry.exercise_id,
            exercise_name,
            date: entry.date.clone(),
            duration_minutes: entry.duration_minutes,
            reps: entry.reps,
            sets: entry.sets,
            intensity: entry.intensity,
            calories_burned: entry.calories_burned,
            complete: entry.complete,
        };
        store.exercises.push(created.clone());
        Ok(created)
    }

    async fn delete_user_exercise(&self, id: i64) -> Result<(), HealthLogError> {
        self.write()?;
        let mut store = self.store.lock().unwrap();
        let before = store.exercises.len();
        store.exercises.retain(|e| e.id != id);
        if store.exercises.len() == before {
            return Err(HealthLogError::NotFound(format!("user exercise {id}")));
        }
        Ok(())
    }

    async fn list_weigh_ins(&self, user_id: i64) -> Result<Vec<WeighIn>, HealthLogError> {
        self.read(Some(Collection::WeighIns))?;
        let store = self.store.lock().unwrap();
        Ok(store
            .weigh_ins
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, HealthLogError> {
        weigh_in.validate()?;
        let weigh_in_id = self.write()?;
        let created = WeighIn {
            weigh_in_id,
            user_id: weigh_in.user_id,
            date: weigh_in.date.clone(),
            weight: weigh_in.weight,
            height: weigh_in.height,
            notes: weigh_in.notes.clone(),
        };
        self.store.lock().unwrap().weigh_ins.push(created.clone());
        Ok(created)
    }

    async fn delete_weigh_in(&self, weigh_in_id: i64) -> Result<(), HealthLogError> {
        self.write()?;
        let mut store = self.store.lock().unwrap();
        let before = store.weigh_ins.len();
        store.weigh_ins.retain(|w| w.weigh_in_id != weigh_in_id);
        if store.weigh_ins.len() == before {
            return Err(HealthLogError::NotFound(format!("weigh-in {weigh_in_id}")));
        }
        Ok(())
    }

    async fn get_profile(&self) -> Result<UserProfile, HealthLogError> {
        self.read(Some(Collection::Profile))?;
        Ok(self.store.lock().unwrap().profile.clone())
    }
}
