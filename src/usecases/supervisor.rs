//! Session supervisor: reacts to identity changes.
//!
//! Subscribes to the identity binding and treats every transition
//! (present/absent/different value) as a fresh session: both state owners are
//! reset and their loads re-triggered. No data outlives the identity it was
//! fetched for.

use crate::ports::IdentityPort;
use crate::usecases::{ChatSessionManager, DashboardAggregator};
use crate::domain::UserId;
use std::sync::Arc;
use tracing::info;

/// Watches the identity channel and drives session resets.
pub struct SessionSupervisor {
    identity: Arc<dyn IdentityPort>,
    chat: Arc<ChatSessionManager>,
    dashboard: Arc<DashboardAggregator>,
}

impl SessionSupervisor {
    pub fn new(
        identity: Arc<dyn IdentityPort>,
        chat: Arc<ChatSessionManager>,
        dashboard: Arc<DashboardAggregator>,
    ) -> Self {
        Self {
            identity,
            chat,
            dashboard,
        }
    }

    /// Apply the currently bound identity, then watch for changes until the
    /// identity subsystem goes away. Call from a spawned task.
    pub async fn run_loop(&self) {
        let mut rx = self.identity.subscribe();
        let initial = rx.borrow_and_update().clone();
        self.dispatch(initial).await;

        while rx.changed().await.is_ok() {
            let identity = rx.borrow_and_update().clone();
            self.dispatch(identity).await;
        }
        info!("identity channel closed; supervisor stopping");
    }

    /// One identity transition: reset both owners, then re-trigger loads when
    /// an identity is present. In-flight work of the previous identity is
    /// orphaned by the resets.
    async fn dispatch(&self, identity: Option<UserId>) {
        match &identity {
            Some(user) => info!(user = %user, "identity available; starting fresh session"),
            None => info!("identity unavailable; clearing session state"),
        }

        let has_identity = identity.is_some();
        self.chat.bind_identity(identity).await;
        self.dashboard.reset().await;

        if has_identity {
            tokio::join!(self.chat.load_history(), self.dashboard.refresh());
        }
    }
}
