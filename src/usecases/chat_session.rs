//! Chat session logic: ordered message log, turn-taking, history reconciliation.
//!
//! - Optimistic append: the user's message lands in the log before any network activity
//! - Single-flight: at most one outstanding send per session
//! - Every turn gets a terminal assistant response, fallback text on failure
//! - Session epoch: results dispatched before an identity reset are discarded

use crate::domain::{ChatLoadState, ChatSession, MessageOrigin, Role, UserId};
use crate::ports::AnalyticsGateway;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Seed message for a fresh session. A chat pane is never blank.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your Social Media Analytics Assistant. \
     How can I help you today? You can ask me about post performance, best times to post, \
     or improvement recommendations.";

/// Terminal reply appended when a send fails. Failures are never silently dropped.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to the analytics service. Please try again.";

/// Result of a `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Backend replied; assistant message appended.
    Delivered,
    /// Backend call failed; fixed fallback reply appended.
    Fallback,
    /// Empty or whitespace-only input. No state change, no network call.
    RejectedEmpty,
    /// A send is already in flight. No state change, no network call.
    Busy,
    /// Identity changed while the call was in flight; the session was reset
    /// and the result discarded.
    Superseded,
}

struct SessionState {
    session: ChatSession,
    send_in_flight: bool,
    /// Bumped on every reset. Late resolutions compare against it.
    epoch: u64,
}

/// Owns the chat session. Observers read cloned snapshots; all mutation goes
/// through this manager.
pub struct ChatSessionManager {
    api: Arc<dyn AnalyticsGateway>,
    state: Mutex<SessionState>,
}

impl ChatSessionManager {
    pub fn new(api: Arc<dyn AnalyticsGateway>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState {
                session: ChatSession::new(None, WELCOME_MESSAGE),
                send_in_flight: false,
                epoch: 0,
            }),
        }
    }

    /// Immutable snapshot of the current session.
    pub async fn snapshot(&self) -> ChatSession {
        self.state.lock().await.session.clone()
    }

    /// Start a fresh session for the given identity. Drops all messages from
    /// the previous one and orphans any in-flight work.
    pub async fn bind_identity(&self, identity: Option<UserId>) {
        let mut st = self.state.lock().await;
        st.epoch += 1;
        st.send_in_flight = false;
        st.session = ChatSession::new(identity, WELCOME_MESSAGE);
        debug!(epoch = st.epoch, "chat session reset");
    }

    /// Fetch prior turns and reconcile the log with server state.
    ///
    /// Non-empty history replaces the welcome seed in server-assigned order;
    /// empty history keeps it. On failure the session degrades to
    /// `HistoryFailed` with the pre-load default intact and stays usable for
    /// new sends.
    pub async fn load_history(&self) -> ChatLoadState {
        let epoch = {
            let mut st = self.state.lock().await;
            if st.session.identity.is_none() {
                return st.session.load_state;
            }
            st.session.load_state = ChatLoadState::LoadingHistory;
            st.epoch
        };

        let result = self.api.chat_history().await;

        let mut st = self.state.lock().await;
        if st.epoch != epoch {
            debug!("history result for a stale session discarded");
            return st.session.load_state;
        }
        match result {
            Ok(turns) => {
                if !turns.is_empty() {
                    st.session.replace_with_history(turns);
                }
                st.session.load_state = ChatLoadState::Ready;
                info!(
                    messages = st.session.messages.len(),
                    "chat history loaded"
                );
            }
            Err(e) => {
                warn!(error = %e, "history load failed; continuing without prior context");
                st.session.load_state = ChatLoadState::HistoryFailed;
            }
        }
        st.session.load_state
    }

    /// Send one message. Appends the user turn synchronously before any
    /// network activity, then appends exactly one assistant turn once the
    /// call resolves. The in-flight flag is released on every exit path
    /// (a reset mid-flight clears it as part of the fresh session).
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::RejectedEmpty;
        }

        let (epoch, pending_id) = {
            let mut st = self.state.lock().await;
            if st.send_in_flight {
                return SendOutcome::Busy;
            }
            st.send_in_flight = true;
            let id = st
                .session
                .push(Role::User, text.to_string(), MessageOrigin::LocalPending);
            (st.epoch, id)
        };

        let result = self.api.send_chat(text).await;

        let mut st = self.state.lock().await;
        if st.epoch != epoch {
            debug!("chat reply for a stale session discarded");
            return SendOutcome::Superseded;
        }
        st.send_in_flight = false;
        match result {
            Ok(reply) => {
                st.session.confirm(pending_id);
                st.session
                    .push(Role::Assistant, reply, MessageOrigin::ServerConfirmed);
                SendOutcome::Delivered
            }
            Err(e) => {
                warn!(error = %e, "chat send failed; appending fallback reply");
                st.session.push(
                    Role::Assistant,
                    FALLBACK_REPLY.to_string(),
                    MessageOrigin::ServerConfirmed,
                );
                SendOutcome::Fallback
            }
        }
    }
}
