//! Infrastructure adapters. Implement outbound ports.
//!
//! Backend HTTP, identity binding, console UI. Map errors to ApiError/DomainError.

pub mod analytics;
pub mod identity;
pub mod ui;
