//! HTTP adapter for the analytics backend.
//!
//! Implements `AnalyticsGateway` over reqwest. Injects the bearer credential
//! and resolved user identifier into every call and normalizes all failures
//! into the `ApiError` taxonomy. No retries, no caching: each call is one
//! fresh round trip.

use crate::adapters::analytics::dto::{
    BestTimesDto, ChatRequest, ChatResponse, HistoryResponse, MetricsSummaryDto,
    RecommendationsResponse,
};
use crate::domain::{
    ApiError, BestTimes, DomainError, HistoryTurn, MetricsSnapshot, UploadReceipt,
};
use crate::ports::{AnalyticsGateway, IdentityPort};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Analytics backend gateway over HTTP.
///
/// Identity is resolved at request-build time: a login/logout between two
/// calls changes the next request's credential and user id, while in-flight
/// requests keep the identity they were dispatched with.
pub struct HttpAnalyticsGateway {
    client: reqwest::Client,
    base_url: String,
    identity: Arc<dyn IdentityPort>,
    placeholder_token: String,
    /// Identifier used when no identity is bound. `None` disables anonymous calls.
    fallback_user: Option<String>,
}

impl HttpAnalyticsGateway {
    /// Create a new gateway.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g. "http://localhost:8000/api")
    /// * `identity` - identity binding consulted on every call
    /// * `placeholder_token` - bearer value when no credential is bound
    /// * `fallback_user` - user id for anonymous calls, or `None` to reject them
    /// * `timeout` - per-request bound; a hung request becomes a Network error
    pub fn new(
        base_url: String,
        identity: Arc<dyn IdentityPort>,
        placeholder_token: String,
        fallback_user: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
            placeholder_token,
            fallback_user,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Bearer value for this call: bound credential or the placeholder.
    fn bearer(&self) -> String {
        self.identity
            .bearer_token()
            .unwrap_or_else(|| self.placeholder_token.clone())
    }

    /// User id for this call: bound identity, else the configured fallback.
    fn resolved_user(&self) -> Result<String, ApiError> {
        if let Some(user) = self.identity.current_identity() {
            return Ok(user.0);
        }
        self.fallback_user.clone().ok_or_else(|| {
            ApiError::Unauthorized("no identity bound and anonymous calls are disabled".into())
        })
    }

    /// Map a non-success status plus body into the error taxonomy.
    fn classify_status(status: StatusCode, body: String) -> ApiError {
        let message: String = body.chars().take(200).collect();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body.chars().take(200).collect::<String>(), "backend returned error");
        Err(Self::classify_status(status, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        // Anonymous policy applies to reads too, even though the body carries no user id.
        self.resolved_user()?;
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalyticsGateway for HttpAnalyticsGateway {
    async fn send_chat(&self, message: &str) -> Result<String, ApiError> {
        let user_id = self.resolved_user()?;
        debug!(user = %user_id, len = message.len(), "sending chat message");

        let response = self
            .client
            .post(self.url("chat"))
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .json(&ChatRequest {
                message,
                user_id: &user_id,
            })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let parsed: ChatResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(parsed.response)
    }

    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, ApiError> {
        let parsed: HistoryResponse = self.get_json("chat/history", &[]).await?;
        Ok(parsed.history.into_iter().map(Into::into).collect())
    }

    async fn metrics_summary(&self) -> Result<MetricsSnapshot, ApiError> {
        let parsed: MetricsSummaryDto = self.get_json("metrics/summary", &[]).await?;
        Ok(parsed.into())
    }

    async fn recommendations(&self, post_type: Option<&str>) -> Result<Vec<String>, ApiError> {
        let query: Vec<(&str, &str)> = post_type.map(|t| ("post_type", t)).into_iter().collect();
        let parsed: RecommendationsResponse = self.get_json("recommendations", &query).await?;
        Ok(parsed.recommendations)
    }

    async fn best_times(&self, post_type: Option<&str>) -> Result<BestTimes, ApiError> {
        let query: Vec<(&str, &str)> = post_type.map(|t| ("post_type", t)).into_iter().collect();
        let parsed: BestTimesDto = self.get_json("best-times", &query).await?;
        Ok(parsed.into())
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        self.resolved_user()?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("upload"))
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn health(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.url("health"))
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_covers_taxonomy() {
        match HttpAnalyticsGateway::classify_status(StatusCode::UNAUTHORIZED, "nope".into()) {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "nope"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        match HttpAnalyticsGateway::classify_status(StatusCode::FORBIDDEN, String::new()) {
            ApiError::Unauthorized(_) => {}
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        match HttpAnalyticsGateway::classify_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom".into(),
        ) {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match HttpAnalyticsGateway::classify_status(StatusCode::BAD_GATEWAY, body) {
            ApiError::Server { message, .. } => assert_eq!(message.len(), 200),
            other => panic!("expected Server, got {other:?}"),
        }
    }
}
