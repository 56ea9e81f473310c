//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ApiError, BestTimes, HistoryTurn, MetricsSnapshot, UploadReceipt, UserId};
use tokio::sync::watch;

/// Analytics backend gateway. One fresh round trip per call: no retries,
/// no caching. Idempotent reads may be called concurrently.
///
/// The gateway resolves the current identity (or the configured fallback)
/// at request-build time; in-flight calls are not retroactively altered
/// when identity changes.
#[async_trait::async_trait]
pub trait AnalyticsGateway: Send + Sync {
    /// Send one chat message and return the assistant's reply.
    async fn send_chat(&self, message: &str) -> Result<String, ApiError>;

    /// Fetch prior turns in server-assigned order (possibly empty).
    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, ApiError>;

    /// Fetch the key-metrics summary across all post types.
    async fn metrics_summary(&self) -> Result<MetricsSnapshot, ApiError>;

    /// Fetch engagement recommendations, optionally scoped to one post type.
    async fn recommendations(&self, post_type: Option<&str>) -> Result<Vec<String>, ApiError>;

    /// Fetch best posting times: per-type when `post_type` is given, otherwise
    /// the overall map.
    async fn best_times(&self, post_type: Option<&str>) -> Result<BestTimes, ApiError>;

    /// Upload a new data file (multipart form).
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    /// Probe backend reachability. Used at startup; failure is non-fatal.
    async fn health(&self) -> Result<(), ApiError>;
}

/// External identity collaborator. Written exclusively by the identity
/// subsystem; read-only from the application's perspective.
pub trait IdentityPort: Send + Sync {
    /// Current user identifier, if an identity is bound.
    fn current_identity(&self) -> Option<UserId>;

    /// Credential for the `Authorization` header, if one is bound.
    fn bearer_token(&self) -> Option<String>;

    /// Change notification: fires whenever identity transitions between
    /// present/absent/different value.
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}
