use crate::errors::SyncError;
use crate::models::Habit;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Remote store for habits.
///
/// `fetch_all` propagates failures. The write operations never fail: any
/// transport or decoding problem is reported as `false`.
pub trait HabitRemote: Send + Sync {
    fn fetch_all(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Vec<Habit>, SyncError>> + Send;

    fn set_completion(
        &self,
        endpoint: &str,
        id: &str,
        completed: bool,
    ) -> impl Future<Output = bool> + Send;

    fn create(&self, endpoint: &str, habit: &Habit) -> impl Future<Output = bool> + Send;

    fn update(
        &self,
        endpoint: &str,
        id: &str,
        name: &str,
        category: &str,
    ) -> impl Future<Output = bool> + Send;

    fn delete(&self, endpoint: &str, id: &str) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    success: bool,
}

/// [`HabitRemote`] speaking the spreadsheet script protocol: one GET per action,
/// parameters in the query string.
#[derive(Debug, Clone)]
pub struct SheetClient {
    http: Client,
}

impl SheetClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn write(&self, endpoint: &str, action: &str, params: &[(&str, &str)]) -> bool {
        let mut query = Vec::with_capacity(params.len() + 1);
        query.push(("action", action));
        query.extend_from_slice(params);

        let response = match self.http.get(endpoint).query(&query).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(action, "habit write failed: {err}");
                return false;
            }
        };

        match response.json::<WriteResponse>().await {
            Ok(body) => {
                if !body.success {
                    warn!(action, "habit endpoint rejected write");
                }
                body.success
            }
            Err(err) => {
                warn!(action, "habit write returned an unreadable body: {err}");
                false
            }
        }
    }
}

impl HabitRemote for SheetClient {
    async fn fetch_all(&self, endpoint: &str) -> Result<Vec<Habit>, SyncError> {
        let response = self
            .http
            .get(endpoint)
            .query(&[("action", "getHabits")])
            .send()
            .await
            .map_err(SyncError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status));
        }

        response
            .json::<Vec<Habit>>()
            .await
            .map_err(SyncError::Decode)
    }

    async fn set_completion(&self, endpoint: &str, id: &str, completed: bool) -> bool {
        let completed = if completed { "true" } else { "false" };
        self.write(endpoint, "updateHabit", &[("id", id), ("completed", completed)])
            .await
    }

    async fn create(&self, endpoint: &str, habit: &Habit) -> bool {
        self.write(
            endpoint,
            "addHabit",
            &[
                ("id", habit.id.as_str()),
                ("name", habit.name.as_str()),
                ("category", habit.category_label()),
            ],
        )
        .await
    }

    async fn update(&self, endpoint: &str, id: &str, name: &str, category: &str) -> bool {
        self.write(
            endpoint,
            "editHabit",
            &[("id", id), ("name", name), ("category", category)],
        )
        .await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> bool {
        self.write(endpoint, "deleteHabit", &[("id", id)]).await
    }
}
