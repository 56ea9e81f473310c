//! Wire DTOs for the analytics backend. JSON over HTTP.
//!
//! Mapping into domain entities happens here; the rest of the crate never
//! sees wire shapes.

use crate::domain::{BestTimes, HistoryTurn, MetricsSnapshot, PostingWindow, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `POST /chat` request body.
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub user_id: &'a str,
}

/// `POST /chat` response body.
#[derive(Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `GET /chat/history` response body.
#[derive(Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryTurnDto>,
}

#[derive(Deserialize)]
pub struct HistoryTurnDto {
    pub role: String,
    pub content: String,
}

impl From<HistoryTurnDto> for HistoryTurn {
    fn from(dto: HistoryTurnDto) -> Self {
        // Anything that is not the assistant speaks for the user.
        let role = if dto.role == "assistant" {
            Role::Assistant
        } else {
            Role::User
        };
        HistoryTurn {
            role,
            content: dto.content,
        }
    }
}

/// `GET /metrics/summary` response body. The backend reports the engagement
/// counters separately; the summed total is derived here. Rate and
/// best-performer fields pass through verbatim.
#[derive(Deserialize)]
pub struct MetricsSummaryDto {
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub avg_engagement_rate: f64,
    pub best_post_type: String,
    pub best_time_overall: String,
}

impl From<MetricsSummaryDto> for MetricsSnapshot {
    fn from(dto: MetricsSummaryDto) -> Self {
        MetricsSnapshot {
            total_engagements: dto.total_likes + dto.total_comments + dto.total_shares,
            avg_engagement_rate: dto.avg_engagement_rate,
            best_post_type: dto.best_post_type,
            best_time_overall: dto.best_time_overall,
        }
    }
}

/// `GET /recommendations` response body.
#[derive(Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

/// `GET /best-times` response body. Shape depends on whether a post type was
/// requested.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum BestTimesDto {
    ForType { best_time: PostingWindow },
    Overall { best_times: HashMap<String, PostingWindow> },
}

impl From<BestTimesDto> for BestTimes {
    fn from(dto: BestTimesDto) -> Self {
        match dto {
            BestTimesDto::ForType { best_time } => BestTimes::ForType(best_time),
            BestTimesDto::Overall { best_times } => BestTimes::Overall(best_times),
        }
    }
}
