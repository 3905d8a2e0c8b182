use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_photo: Option<String>,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Placeholder returned when a participant id cannot be resolved.
    pub fn unknown() -> Self {
        User {
            user_id: String::new(),
            display_name: "Unknown User".to_string(),
            profile_photo: None,
            is_online: false,
            last_seen: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    /// Exactly two user ids; order carries no meaning.
    pub participants: Vec<String>,
    /// Denormalized copy of the most recent message in this conversation.
    /// Invariant: `last_message.conversation_id == conversation_id` when present.
    #[serde(default)]
    pub last_message: Option<Message>,
    pub unread_count: u32,
    pub is_pinned: bool,
    pub is_muted: bool,
}

impl Conversation {
    /// The participant that is not `user_id`, if the conversation has one.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.as_str() != user_id)
            .map(|p| p.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

impl Message {
    /// Advance delivery status; regressions are ignored so the status stays
    /// monotonically non-decreasing.
    pub fn advance_status(&mut self, status: MessageStatus) {
        if status > self.status {
            self.status = status;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
}

/// Delivery status of a message, ordered so that a status can only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}
