//! Implements IdentityPort over a tokio watch channel.
//!
//! The binding is the single writer of identity state; the application only
//! reads it. Every login/logout/switch fires the change notification.

use crate::domain::UserId;
use crate::ports::IdentityPort;
use std::sync::RwLock;
use tokio::sync::watch;
use tracing::info;

/// In-process identity binding.
///
/// Holds the current user identifier behind a watch channel (the change
/// notification) and the bearer credential beside it. Credentials never
/// travel through the notification channel.
pub struct WatchIdentityBinding {
    identity: watch::Sender<Option<UserId>>,
    token: RwLock<Option<String>>,
}

impl WatchIdentityBinding {
    /// Create a binding, optionally pre-authenticated from configuration.
    pub fn new(initial_user: Option<UserId>, initial_token: Option<String>) -> Self {
        let (identity, _) = watch::channel(initial_user);
        Self {
            identity,
            token: RwLock::new(initial_token),
        }
    }

    /// Bind a new identity. Subscribers see the change even when switching
    /// directly from one user to another.
    pub fn login(&self, user: UserId, token: Option<String>) {
        info!(user = %user, "identity bound");
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
        self.identity.send_replace(Some(user));
    }

    /// Drop the bound identity and credential.
    pub fn logout(&self) {
        info!("identity unbound");
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
        self.identity.send_replace(None);
    }
}

impl IdentityPort for WatchIdentityBinding {
    fn current_identity(&self) -> Option<UserId> {
        self.identity.borrow().clone()
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.identity.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_and_logout_fire_change_notifications() {
        let binding = WatchIdentityBinding::new(None, None);
        let mut rx = binding.subscribe();
        assert_eq!(binding.current_identity(), None);

        binding.login(UserId::from("user-1"), Some("tok-1".into()));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(UserId::from("user-1")));
        assert_eq!(binding.bearer_token(), Some("tok-1".into()));

        binding.login(UserId::from("user-2"), None);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(UserId::from("user-2")));
        assert_eq!(binding.bearer_token(), None);

        binding.logout();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
    }
}
