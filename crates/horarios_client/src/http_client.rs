//! HTTP client for the scheduling data service.
//!
//! This module provides a reqwest-based implementation of the [`ScheduleSource`](crate::ScheduleSource) trait.

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::{HorariosError, ScheduleSource};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Client for the scheduling REST backend using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestScheduleClient {
    base_url: String,
    api_token: Option<SecretString>,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl ReqwestScheduleClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Root of the backend (e.g., "http://localhost:8000")
    /// * `api_token` - Bearer token, when the backend requires one
    pub fn new(base_url: &str, api_token: Option<SecretString>) -> Result<Self, HorariosError> {
        Self::from_config(&Config {
            base_url: base_url.to_string(),
            api_token,
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, HorariosError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            retry: RetryPolicy::default(),
            client,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build a GET request, authenticated when a token is configured.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, HorariosError> {
        self.retry
            .retry_async(|| async move {
                tracing::debug!(%url, "GET");
                let resp = self.get_request(url).send().await?;
                self.handle_response(resp).await
            })
            .await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<serde_json::Value, HorariosError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> HorariosError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.chars().take(256).collect());

        match status {
            404 => HorariosError::NotFound(message),
            401 | 403 => HorariosError::Auth(message),
            _ => HorariosError::from_status(status, message),
        }
    }
}

#[async_trait]
impl ScheduleSource for ReqwestScheduleClient {
    async fn get_schedule_by_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<serde_json::Value, HorariosError> {
        let url = format!("{}/horarios/docente/{}", self.base_url, teacher_id);
        self.get_json(&url).await
    }

    async fn get_schedule_by_room(&self, room_id: i64) -> Result<serde_json::Value, HorariosError> {
        let url = format!("{}/horarios/aula/{}", self.base_url, room_id);
        self.get_json(&url).await
    }
}
