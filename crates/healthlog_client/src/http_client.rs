//! HTTP client implementation for the health log resource API.
//!
//! This module provides a reqwest-based implementation of the [`HealthLogClient`](crate::HealthLogClient) trait.

use crate::config::Config;
use crate::observability::{Outcome, record_request};
use crate::{
    Exercise, Food, HealthLogClient, HealthLogError, Meal, MealFood, NewFood, NewMeal,
    NewMealFood, NewUserExercise, NewWeighIn, UserExercise, UserProfile, WeighIn,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Instant;

/// Client for the health log API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestHealthLogClient {
    base_url: String,
    api_token: Option<SecretString>,
    client: reqwest::Client,
}

impl ReqwestHealthLogClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:8080")
    /// * `api_token` - Bearer token attached to every request, if any
    pub fn new(base_url: &str, api_token: Option<SecretString>) -> Self {
        Self::with_http_client(base_url, api_token, reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, ...).
    pub fn with_http_client(
        base_url: &str,
        api_token: Option<SecretString>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, HealthLogError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_http_client(
            &config.base_url,
            config.api_token.clone(),
            client,
        ))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Build an authenticated GET request.
    fn get_request<U: reqwest::IntoUrl>(&self, url: U) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// Build an authenticated DELETE request.
    fn delete_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.delete(url))
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn segment_url(&self, segments: &[&str]) -> Result<reqwest::Url, HealthLogError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| HealthLogError::Config(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| HealthLogError::Config("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, recording its outcome and latency.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, HealthLogError> {
        let request = request.build()?;
        let method = request.method().as_str().to_owned();
        let path = request.url().path().to_owned();
        let started = Instant::now();
        tracing::debug!(%method, %path, "sending request");
        match self.client.execute(request).await {
            Ok(resp) => {
                record_request(
                    &method,
                    Outcome::from_status(resp.status().as_u16()),
                    started.elapsed(),
                );
                Ok(resp)
            }
            Err(e) => {
                record_request(&method, Outcome::Transport, started.elapsed());
                Err(e.into())
            }
        }
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, HealthLogError> {
        let resp = self.send(request).await?;
        self.handle_response(resp).await
    }

    /// Execute a request with no expected response body.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), HealthLogError> {
        let resp = self.send(request).await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(())
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, HealthLogError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> HealthLogError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        tracing::debug!(status, body = %body_snippet, "request failed");
        HealthLogError::from_status(status, body_snippet)
    }
}

fn require_query(kind: &str, query: &str) -> Result<(), HealthLogError> {
    if query.trim().is_empty() {
        return Err(HealthLogError::InvalidInput(format!(
            "{kind} search query must not be empty"
        )));
    }
    Ok(())
}

#[async_trait]
impl HealthLogClient for ReqwestHealthLogClient {
    async fn list_meals(&self, user_id: i64) -> Result<Vec<Meal>, HealthLogError> {
        let url = format!("{}/meals/user/{}", self.base_url, user_id);
        self.execute_json(self.get_request(&url)).await
    }

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, HealthLogError> {
        let url = format!("{}/meals", self.base_url);
        self.execute_json(self.post_request(&url).json(meal)).await
    }

    async fn get_meal_foods(&self, meal_id: i64) -> Result<Vec<MealFood>, HealthLogError> {
        let url = format!("{}/meal-food/meal/{}", self.base_url, meal_id);
        self.execute_json(self.get_request(&url)).await
    }

    async fn create_meal_food(&self, link: &NewMealFood) -> Result<MealFood, HealthLogError> {
        let url = format!("{}/meal-food", self.base_url);
        self.execute_json(self.post_request(&url).json(link)).await
    }

    async fn delete_meal_food(&self, meal_food_id: i64) -> Result<(), HealthLogError> {
        let url = format!("{}/meal-food/{}", self.base_url, meal_food_id);
        self.execute_empty(self.delete_request(&url)).await
    }

    async fn get_food(&self, food_id: i64) -> Result<Food, HealthLogError> {
        let url = format!("{}/foods/{}", self.base_url, food_id);
        self.execute_json(self.get_request(&url)).await
    }

    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, HealthLogError> {
        require_query("food", name)?;
        let url = format!("{}/foods/search", self.base_url);
        self.execute_json(self.get_request(&url).query(&[("q", name)]))
            .await
    }

    async fn create_food(&self, food: &NewFood) -> Result<Food, HealthLogError> {
        let url = format!("{}/foods", self.base_url);
        self.execute_json(self.post_request(&url).json(food)).await
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, HealthLogError> {
        let url = format!("{}/exercises", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn search_exercises(&self, name: &str) -> Result<Vec<Exercise>, HealthLogError> {
        require_query("exercise", name)?;
        let url = self.segment_url(&["exercises", "name", name])?;
        self.execute_json(self.get_request(url)).await
    }

    async fn list_user_exercises(&self) -> Result<Vec<UserExercise>, HealthLogError> {
        let url = format!("{}/user-exercises", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn create_user_exercise(
        &self,
        entry: &NewUserExercise,
    ) -> Result<UserExercise, HealthLogError> {
        entry.validate()?;
        let url = format!("{}/user-exercises", self.base_url);
        self.execute_json(self.post_request(&url).json(entry)).await
    }

    async fn delete_user_exercise(&self, id: i64) -> Result<(), HealthLogError> {
        let url = format!("{}/user-exercises/{}", self.base_url, id);
        self.execute_empty(self.delete_request(&url)).await
    }

    async fn list_weigh_ins(&self, user_id: i64) -> Result<Vec<WeighIn>, HealthLogError> {
        let url = format!("{}/api/weighin/user/{}", self.base_url, user_id);
        self.execute_json(self.get_request(&url)).await
    }

    async fn create_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, HealthLogError> {
        weigh_in.validate()?;
        let url = format!("{}/api/weighin", self.base_url);
        self.execute_json(self.post_request(&url).json(weigh_in))
            .await
    }

    async fn delete_weigh_in(&self, weigh_in_id: i64) -> Result<(), HealthLogError> {
        let url = format!("{}/api/weighin/{}", self.base_url, weigh_in_id);
        self.execute_empty(self.delete_request(&url)).await
    }

    async fn get_profile(&self) -> Result<UserProfile, HealthLogError> {
        let url = format!("{}/api/profile/me", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ReqwestHealthLogClient::new("http://localhost:8080/", None);
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn segment_url_encodes_names() {
        let client = ReqwestHealthLogClient::new("http://localhost:8080/v1", None);
        let url = client
            .segment_url(&["exercises", "name", "jump rope/fast"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/exercises/name/jump%20rope%2Ffast"
        );
    }

    #[test]
    fn from_config_builds_client() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        let client = ReqwestHealthLogClient::from_config(&cfg).expect("client");
        assert_eq!(client.base_url, crate::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_search_query_is_rejected() {
        assert!(require_query("food", "   ").is_err());
        assert!(require_query("food", "oats").is_ok());
    }
}
