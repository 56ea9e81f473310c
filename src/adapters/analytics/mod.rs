//! Analytics backend adapters: HTTP gateway and a canned mock.

pub mod dto;
pub mod gateway;
pub mod mock;

pub use gateway::HttpAnalyticsGateway;
pub use mock::MockAnalyticsGateway;
