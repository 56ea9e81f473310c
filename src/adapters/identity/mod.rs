//! Identity subsystem adapter: in-process binding with change notification.

pub mod binding;

pub use binding::WatchIdentityBinding;
