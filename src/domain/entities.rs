//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/IO types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque user identifier supplied by the identity subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ordinal message id, monotonic within a session. Never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Whether a message has been acknowledged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageOrigin {
    /// Appended optimistically before the backend call resolved.
    LocalPending,
    /// Acknowledged by (or received from) the backend.
    ServerConfirmed,
}

/// A single conversational turn. Text may contain markup; it is rendered, not parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub origin: MessageOrigin,
}

/// One prior turn as returned by the history endpoint. Ids are assigned locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

/// Session-level load state for the chat pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatLoadState {
    #[default]
    Uninitialized,
    LoadingHistory,
    Ready,
    /// History fetch failed. Session stays usable for new sends, without prior context.
    HistoryFailed,
}

/// The ordered message log plus session lifecycle state.
///
/// Owned exclusively by the chat session manager; observers receive clones.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub messages: Vec<Message>,
    pub identity: Option<UserId>,
    pub load_state: ChatLoadState,
    next_id: u64,
}

impl ChatSession {
    /// Fresh session seeded with the given welcome message.
    pub fn new(identity: Option<UserId>, welcome: &str) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            identity,
            load_state: ChatLoadState::Uninitialized,
            next_id: 0,
        };
        session.push(Role::Assistant, welcome.to_string(), MessageOrigin::ServerConfirmed);
        session
    }

    /// Append a message, assigning the next ordinal id. Append order is chronological order.
    pub fn push(&mut self, role: Role, text: String, origin: MessageOrigin) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            text,
            origin,
        });
        id
    }

    /// Retag a pending message as confirmed. The value is replaced at its index;
    /// id and position are untouched.
    pub fn confirm(&mut self, id: MessageId) {
        if let Some(slot) = self.messages.iter_mut().find(|m| m.id == id) {
            *slot = Message {
                origin: MessageOrigin::ServerConfirmed,
                ..slot.clone()
            };
        }
    }

    /// Replace the log with server-ordered history turns. Ordinals restart from zero.
    pub fn replace_with_history(&mut self, turns: Vec<HistoryTurn>) {
        self.messages.clear();
        self.next_id = 0;
        for turn in turns {
            self.push(turn.role, turn.content, MessageOrigin::ServerConfirmed);
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Key metrics across all post types. Replaced wholesale on refresh, never
/// mutated incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sum of the backend's like/comment/share counters.
    pub total_engagements: u64,
    /// Passed through verbatim from the backend.
    pub avg_engagement_rate: f64,
    pub best_post_type: String,
    pub best_time_overall: String,
}

/// Aggregate load state for the dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardLoadState {
    #[default]
    Idle,
    Loading,
    /// Exactly one source succeeded; the other field stays absent.
    PartiallyLoaded,
    /// Both metrics and recommendations are present.
    Loaded,
    /// Every source failed.
    Failed,
}

/// Reporting window for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::Week,
        DateRange::Month,
        DateRange::Quarter,
        DateRange::Year,
    ];

    pub fn days(self) -> u16 {
        match self {
            DateRange::Week => 7,
            DateRange::Month => 30,
            DateRange::Quarter => 90,
            DateRange::Year => 365,
        }
    }

    pub fn from_days(days: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.days() == days)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "last {} days", self.days())
    }
}

/// Render-ready dashboard snapshot. Observers receive clones; fields are only
/// populated for sources that succeeded on the current trigger.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub metrics: Option<MetricsSnapshot>,
    pub recommendations: Option<Vec<String>>,
    pub load_state: DashboardLoadState,
    pub date_range: DateRange,
}

/// A recommended posting slot with the backend's rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingWindow {
    pub day: String,
    pub time: String,
    pub reason: String,
}

/// Best posting times, per post type or overall. The backend returns one of
/// two shapes depending on whether a post type was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum BestTimes {
    /// `{"best_time": {...}}` for a specific post type.
    ForType(PostingWindow),
    /// `{"best_times": {...}}` keyed by post type.
    Overall(HashMap<String, PostingWindow>),
}

/// Backend acknowledgement for an uploaded data file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_monotonic_ids_in_append_order() {
        let mut session = ChatSession::new(None, "welcome");
        let a = session.push(Role::User, "first".into(), MessageOrigin::LocalPending);
        let b = session.push(Role::Assistant, "second".into(), MessageOrigin::ServerConfirmed);
        assert!(a < b);
        let ids: Vec<_> = session.messages.iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn confirm_keeps_id_and_position() {
        let mut session = ChatSession::new(None, "welcome");
        let id = session.push(Role::User, "hello".into(), MessageOrigin::LocalPending);
        session.push(Role::Assistant, "hi".into(), MessageOrigin::ServerConfirmed);
        session.confirm(id);

        let msg = &session.messages[1];
        assert_eq!(msg.id, id);
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.origin, MessageOrigin::ServerConfirmed);
    }

    #[test]
    fn history_replacement_preserves_server_order() {
        let mut session = ChatSession::new(None, "welcome");
        session.replace_with_history(vec![
            HistoryTurn {
                role: Role::Assistant,
                content: "Welcome".into(),
            },
            HistoryTurn {
                role: Role::User,
                content: "Hi".into(),
            },
        ]);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::Assistant);
        assert_eq!(session.messages[0].text, "Welcome");
        assert_eq!(session.messages[1].role, Role::User);
        assert_eq!(session.messages[1].text, "Hi");
    }

    #[test]
    fn date_range_round_trips_supported_windows() {
        for days in [7u16, 30, 90, 365] {
            assert_eq!(DateRange::from_days(days).map(DateRange::days), Some(days));
        }
        assert_eq!(DateRange::from_days(14), None);
    }
}
