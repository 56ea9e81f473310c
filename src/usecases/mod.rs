//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_session;
pub mod dashboard;
pub mod supervisor;

pub use chat_session::{ChatSessionManager, SendOutcome};
pub use dashboard::DashboardAggregator;
pub use supervisor::SessionSupervisor;
