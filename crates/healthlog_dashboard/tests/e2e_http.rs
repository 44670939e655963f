use std::sync::Arc;

use chrono::NaiveDate;
use healthlog_client::http_client::ReqwestHealthLogClient;
use healthlog_client::{MealType, MeasurementUnit};
use healthlog_dashboard::{
    DayRange, FoodLine, LoadState, LoggingMiddleware, Session, ViewCoordinator,
};
use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 11).unwrap()
}

fn coordinator_for(server: &MockServer) -> ViewCoordinator {
    let http = ReqwestHealthLogClient::new(&server.uri(), Some(SecretString::new("tok".into())));
    let client = Arc::new(LoggingMiddleware::new(http));
    ViewCoordinator::new(client, Session::new(7).unwrap()).with_today(today)
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_week(server: &MockServer) {
    mount_get(
        server,
        "/meals/user/7",
        serde_json::json!([
            {"mealId": 1, "userId": 7, "type": "BREAKFAST", "date": "2025-11-11"},
            {"mealId": 2, "userId": 7, "type": "DINNER", "date": "2025-11-08T19:30:00"},
            {"mealId": 3, "userId": 7, "type": "LUNCH", "date": "2025-10-01"}
        ]),
    )
    .await;
    mount_get(
        server,
        "/meal-food/meal/1",
        serde_json::json!([{"id": 10, "mealId": 1, "foodId": 5, "servings": 2.0}]),
    )
    .await;
    mount_get(
        server,
        "/meal-food/meal/2",
        serde_json::json!([{"id": 11, "mealId": 2, "foodId": 6, "servings": 1.0}]),
    )
    .await;
    mount_get(
        server,
        "/foods/5",
        serde_json::json!({"id": 5, "name": "Oats", "calories": 150.0, "amount": 1.0, "unit": "CUP", "servings": 1.0}),
    )
    .await;
    mount_get(
        server,
        "/foods/6",
        serde_json::json!({"id": 6, "name": "Pasta", "calories": 400.0, "amount": 200.0, "unit": "GRAM", "servings": 1.0}),
    )
    .await;
    mount_get(
        server,
        "/user-exercises",
        serde_json::json!([
            {"id": 20, "userId": 7, "exerciseId": 1, "exerciseName": "Running", "date": "2025-11-11",
             "durationMinutes": 30.0, "intensity": "MODERATE", "caloriesBurned": 250.0, "complete": true},
            {"id": 21, "userId": 8, "exerciseId": 1, "exerciseName": "Running", "date": "2025-11-11",
             "durationMinutes": 60.0, "intensity": "VIGOROUS", "caloriesBurned": 700.0, "complete": true}
        ]),
    )
    .await;
    mount_get(
        server,
        "/api/weighin/user/7",
        serde_json::json!([
            {"weighInId": 30, "userId": 7, "date": "2025-11-09", "weight": 180.0},
            {"weighInId": 31, "userId": 7, "date": "2025-11-11T07:00:00", "weight": 178.0, "notes": "after run"}
        ]),
    )
    .await;
    mount_get(
        server,
        "/api/profile/me",
        serde_json::json!({"firstName": "Sam", "initialWeight": 190.0, "weight": 178.0, "goalWeight": 170.0}),
    )
    .await;
}

#[tokio::test]
async fn dashboard_over_http_matches_the_week() {
    let server = MockServer::start().await;
    mount_week(&server).await;

    let coordinator = coordinator_for(&server);
    assert!(coordinator.refresh_dashboard().await);
    let view = match coordinator.dashboard().await {
        LoadState::Loaded(view) => view,
        other => panic!("dashboard not loaded: {other:?}"),
    };

    assert_eq!(view.snapshot.calories_in, 300);
    assert_eq!(view.snapshot.calories_out, 250);
    assert_eq!(view.snapshot.latest_weigh_in, 178.0);
    assert_eq!(
        view.snapshot.weight_history,
        vec![0.0, 0.0, 0.0, 0.0, 180.0, 180.0, 178.0]
    );
    assert_eq!(view.snapshot.calories_history[3], 400.0);
    assert_eq!(view.snapshot.calories_history[6], 50.0);

    assert_eq!(view.progress.net_calories, 50);
    assert_eq!(view.progress.weight_change, -2.0);
    assert_eq!(view.progress.goal_progress_percent, 60);
    assert_eq!(view.progress.remaining_weight, 8.0);
    assert_eq!(view.progress.days_active, 3);

    assert_eq!(view.day_keys.first().map(String::as_str), Some("2025-11-05"));
    assert_eq!(view.day_labels.last().map(String::as_str), Some("Tue"));
    assert!(view.weight_bars[..4].iter().all(|b| *b == 0.0));
}

#[tokio::test]
async fn dashboard_survives_a_failing_food_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foods/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_week(&server).await;

    let coordinator = coordinator_for(&server);
    coordinator.refresh_dashboard().await;
    let view = coordinator.dashboard().await.loaded().cloned().expect("view");
    assert_eq!(view.snapshot.calories_in, 0);
    assert_eq!(view.snapshot.calories_history[3], 400.0);
}

#[tokio::test]
async fn forbidden_food_lookup_keeps_other_lines_and_collections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meal-food/meal/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 10, "mealId": 1, "foodId": 5, "servings": 1.0},
            {"id": 13, "mealId": 1, "foodId": 7, "servings": 1.0}
        ])))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/foods/7"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_week(&server).await;

    let coordinator = coordinator_for(&server);
    coordinator.refresh_dashboard().await;
    let view = coordinator.dashboard().await.loaded().cloned().expect("view");
    assert_eq!(view.snapshot.calories_in, 150);
    assert_eq!(view.snapshot.calories_out, 250);
    assert_eq!(view.snapshot.latest_weigh_in, 178.0);
    assert_eq!(view.snapshot.weight_history[6], 178.0);
}

#[tokio::test]
async fn unauthorized_dashboard_falls_back_to_zeroes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let coordinator = coordinator_for(&server);
    coordinator.refresh_dashboard().await;
    let view = coordinator.dashboard().await.loaded().cloned().expect("view");
    assert_eq!(view.snapshot.calories_in, 0);
    assert_eq!(view.snapshot.weight_history, vec![0.0; 7]);
    assert_eq!(view.snapshot.calories_history, vec![0.0; 7]);
    assert_eq!(view.day_keys.len(), 7);
    assert_eq!(view.progress.goal_progress_percent, 0);
}

#[tokio::test]
async fn deleting_a_meal_line_reloads_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meal-food/meal/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 10, "mealId": 1, "foodId": 5, "servings": 2.0},
            {"id": 12, "mealId": 1, "foodId": 6, "servings": 0.5}
        ])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_week(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/meal-food/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator_for(&server);
    coordinator
        .load_range(DayRange::new("2025-11-10", "2025-11-11"))
        .await;
    let before = coordinator.history().await;
    let rows = before.meal_rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.meal_food_id == 12));
    assert_eq!(before.exercise_rows().len(), 1);
    assert_eq!(before.weigh_in_rows().len(), 1);

    coordinator.delete_meal_line(12).await.expect("delete");

    let after = coordinator.history().await;
    let rows = after.meal_rows();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|r| r.meal_food_id != 12));
}

#[tokio::test]
async fn logging_a_meal_posts_every_step() {
    let server = MockServer::start().await;
    mount_week(&server).await;
    Mock::given(method("POST"))
        .and(path("/meals"))
        .and(body_partial_json(serde_json::json!({"userId": 7, "type": "SNACK", "date": "2025-11-11"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
            {"mealId": 40, "userId": 7, "type": "SNACK", "date": "2025-11-11"}
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/foods/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 5, "name": "Oats", "calories": 150.0, "amount": 1.0, "unit": "CUP", "servings": 1.0}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/meal-food"))
        .and(body_partial_json(serde_json::json!({"mealId": 40, "foodId": 5, "servings": 1.0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
            {"id": 41, "mealId": 40, "foodId": 5, "servings": 1.0}
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/foods"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = coordinator_for(&server);
    let line = FoodLine {
        name: "oats".into(),
        calories: 150.0,
        amount: 1.0,
        unit: MeasurementUnit::Cup,
        servings: 1.0,
    };
    let logged = coordinator
        .log_meal(MealType::Snack, today(), &[line])
        .await
        .expect("logged");
    assert_eq!(logged.meal.meal_id, 40);
    assert_eq!(logged.links.len(), 1);
}
