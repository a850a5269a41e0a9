//! HTTP client for a running hackmatch server, used by the CLI commands.
//!
//! The base URL comes from [`Config::api_url`](crate::config::Config), i.e.
//! `HACKMATCH_URL`, defaulting to the local server.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct HackmatchClient {
    base_url: String,
    client: Client,
}

impl HackmatchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
            StatusCode::CONFLICT => Err(ClientError::Conflict(body)),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    /// Whether the server answers its health check.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    pub async fn get_recommendations(
        &self,
        subject_id: Uuid,
        subject_type: PartyType,
        k: Option<usize>,
    ) -> Result<RecommendationResponse, ClientError> {
        let mut query = vec![
            ("subject_id", subject_id.to_string()),
            ("subject_type", subject_type.as_str().to_string()),
        ];
        if let Some(k) = k {
            query.push(("k", k.to_string()));
        }

        let response = self
            .client
            .get(self.url("/recommendations"))
            .query(&query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn create_join_request(
        &self,
        input: &CreateJoinRequestInput,
    ) -> Result<JoinRequestCreated, ClientError> {
        let response = self
            .client
            .post(self.url("/join-requests"))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn respond_to_join_request(
        &self,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<JoinRequestResolved, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/join-requests/{}/respond", request_id)))
            .json(&RespondJoinRequestInput { decision })
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn list_notifications(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<Notification>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/participants/{}/notifications", recipient_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<UnreadCount, ClientError> {
        let response = self
            .client
            .get(self.url(&format!(
                "/participants/{}/notifications/unread-count",
                recipient_id
            )))
            .send()
            .await?;
        self.handle_response(response).await
    }
}
