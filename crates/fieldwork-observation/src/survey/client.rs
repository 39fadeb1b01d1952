//! Remote survey-service client.
//!
//! Speaks the service's JSON-RPC endpoint: a session key is obtained once
//! with the configured credentials and cached; listings are filtered and
//! paged on this side. Every request carries a hard timeout, and any
//! transport or service failure surfaces as
//! [`ComponentError::Upstream`] -- the client never retries on its own.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use fieldwork_component::ComponentError;

fn default_timeout_secs() -> u64 {
    10
}

/// Connection settings for the survey service, from the host's
/// `[components.web-survey-observation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyServiceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SurveyServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One survey as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: String,
    pub title: String,
}

/// One page of a survey listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyPage {
    pub surveys: Vec<SurveySummary>,
    /// Matching surveys before paging.
    pub total: usize,
}

/// Apply title filtering and offset/size paging to a listing.
fn page_surveys(
    surveys: Vec<SurveySummary>,
    filter: Option<&str>,
    start: usize,
    size: usize,
) -> SurveyPage {
    let matched: Vec<SurveySummary> = match filter {
        None => surveys,
        Some(needle) => {
            let needle = needle.to_lowercase();
            surveys
                .into_iter()
                .filter(|survey| survey.title.to_lowercase().contains(&needle))
                .collect()
        }
    };
    let total = matched.len();
    let surveys = matched.into_iter().skip(start).take(size).collect();
    SurveyPage { surveys, total }
}

/// JSON-RPC client for the survey service.
pub struct SurveyClient {
    config: SurveyServiceConfig,
    http: reqwest::Client,
    session_key: Mutex<Option<String>>,
}

impl SurveyClient {
    pub fn new(config: SurveyServiceConfig) -> Result<Self, ComponentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ComponentError::Upstream(err.to_string()))?;
        Ok(Self {
            config,
            http,
            session_key: Mutex::new(None),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ComponentError> {
        debug!(%method, url = %self.config.base_url, "survey service call");
        let response = self
            .http
            .post(&self.config.base_url)
            .json(&json!({ "method": method, "params": params, "id": 1 }))
            .send()
            .await
            .map_err(|err| ComponentError::Upstream(err.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| ComponentError::Upstream(err.to_string()))?;
        if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
            return Err(ComponentError::Upstream(error.to_string()));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Session key for the configured account, fetched once and cached.
    /// The guard is never held across the fetch.
    async fn session_key(&self) -> Result<String, ComponentError> {
        if let Some(key) = self.session_key.lock().clone() {
            return Ok(key);
        }
        let result = self
            .call(
                "get_session_key",
                json!([self.config.username, self.config.password]),
            )
            .await?;
        let key = result
            .as_str()
            .ok_or_else(|| {
                ComponentError::Upstream("survey service returned no session key".into())
            })?
            .to_string();
        *self.session_key.lock() = Some(key.clone());
        Ok(key)
    }

    /// Surveys owned by `username`, filtered by title and paged.
    pub async fn list_surveys_by_user(
        &self,
        username: &str,
        filter: Option<&str>,
        start: usize,
        size: usize,
    ) -> Result<SurveyPage, ComponentError> {
        let session_key = self.session_key().await?;
        let result = self.call("list_surveys", json!([session_key, username])).await?;
        let surveys: Vec<SurveySummary> = serde_json::from_value(result)
            .map_err(|err| ComponentError::Upstream(format!("unexpected survey listing: {err}")))?;
        Ok(page_surveys(surveys, filter, start, size))
    }
}
