//! Mock analytics gateway for development without a running backend.
//!
//! Returns hardcoded responses and simulates network latency.

use crate::domain::{
    ApiError, BestTimes, HistoryTurn, MetricsSnapshot, PostingWindow, UploadReceipt,
};
use crate::ports::AnalyticsGateway;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

/// Mock gateway. Canned data, no network.
///
/// Simulates latency with a configurable delay so loading states are visible.
pub struct MockAnalyticsGateway {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAnalyticsGateway {
    /// Create a new mock gateway with default delay (150ms).
    pub fn new() -> Self {
        Self { delay_ms: 150 }
    }

    /// Create a mock gateway with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }

    fn canned_windows() -> HashMap<String, PostingWindow> {
        let mut map = HashMap::new();
        map.insert(
            "reel".to_string(),
            PostingWindow {
                day: "Sunday".into(),
                time: "19:00".into(),
                reason: "31% higher engagement than average".into(),
            },
        );
        map.insert(
            "image".to_string(),
            PostingWindow {
                day: "Wednesday".into(),
                time: "12:00".into(),
                reason: "22% higher engagement than average".into(),
            },
        );
        map.insert(
            "carousel".to_string(),
            PostingWindow {
                day: "Saturday".into(),
                time: "20:00".into(),
                reason: "27% higher engagement than average".into(),
            },
        );
        map.insert(
            "video".to_string(),
            PostingWindow {
                day: "Friday".into(),
                time: "21:00".into(),
                reason: "25% higher engagement than average".into(),
            },
        );
        map
    }
}

impl Default for MockAnalyticsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalyticsGateway for MockAnalyticsGateway {
    async fn send_chat(&self, message: &str) -> Result<String, ApiError> {
        info!(len = message.len(), "[MOCK] Simulating chat response");
        self.simulate_latency().await;
        Ok(format!(
            "[MOCK] You asked: \"{}\". Reels posted on Sunday evenings are currently \
             your strongest performers. Configure PULSEBOARD_API_URL to query the \
             real analytics backend.",
            message.trim()
        ))
    }

    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, ApiError> {
        info!("[MOCK] Simulating empty chat history");
        self.simulate_latency().await;
        Ok(Vec::new())
    }

    async fn metrics_summary(&self) -> Result<MetricsSnapshot, ApiError> {
        info!("[MOCK] Simulating metrics summary");
        self.simulate_latency().await;
        // Mirrors the shape of the real backend's summary: likes 247500,
        // comments 21840, shares 28950 already summed.
        Ok(MetricsSnapshot {
            total_engagements: 298_290,
            avg_engagement_rate: 3.2,
            best_post_type: "reel".into(),
            best_time_overall: "19:00 Sunday".into(),
        })
    }

    async fn recommendations(&self, post_type: Option<&str>) -> Result<Vec<String>, ApiError> {
        info!(post_type, "[MOCK] Simulating recommendations");
        self.simulate_latency().await;
        Ok(vec![
            "Post at least 3-4 times per week to maintain audience engagement".into(),
            "Use 3-5 relevant hashtags per post to increase discoverability".into(),
            "Include a clear call-to-action in your captions to boost comment rates".into(),
            "Respond to comments within 1 hour to increase follower loyalty".into(),
            "Analyze your top-performing posts monthly and create similar content".into(),
        ])
    }

    async fn best_times(&self, post_type: Option<&str>) -> Result<BestTimes, ApiError> {
        info!(post_type, "[MOCK] Simulating best posting times");
        self.simulate_latency().await;
        let mut windows = Self::canned_windows();
        match post_type {
            Some(kind) => match windows.remove(kind) {
                Some(window) => Ok(BestTimes::ForType(window)),
                None => Ok(BestTimes::Overall(Self::canned_windows())),
            },
            None => Ok(BestTimes::Overall(windows)),
        }
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        info!(file_name, size = bytes.len(), "[MOCK] Simulating upload");
        self.simulate_latency().await;
        Ok(UploadReceipt {
            status: "success".into(),
            message: "Data uploaded and processed successfully".into(),
        })
    }

    async fn health(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway() {
        let gateway = MockAnalyticsGateway::with_delay(10);

        let metrics = gateway.metrics_summary().await.unwrap();
        assert_eq!(metrics.total_engagements, 298_290);
        assert_eq!(metrics.best_post_type, "reel");

        let recs = gateway.recommendations(None).await.unwrap();
        assert_eq!(recs.len(), 5);

        match gateway.best_times(Some("reel")).await.unwrap() {
            BestTimes::ForType(window) => assert_eq!(window.day, "Sunday"),
            other => panic!("expected per-type window, got {other:?}"),
        }
    }
}
