//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    BestTimes, ChatLoadState, ChatSession, DashboardLoadState, DashboardView, DateRange,
    HistoryTurn, Message, MessageId, MessageOrigin, MetricsSnapshot, PostingWindow, Role,
    UploadReceipt, UserId,
};
pub use errors::{ApiError, DomainError};
