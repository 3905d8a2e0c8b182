// Mock data store: three independent in-memory collections seeded from static
// fixtures, each fronted by an artificial-latency async API. An explicitly
// constructed instance is passed to consumers; clones share the same data.
// Everything lives in memory only and is lost when the process exits.

pub mod collection;

use chrono::Utc;
use log::info;
use thiserror::Error;

use crate::models::{Conversation, Message, MessageStatus, User};
use collection::{Collection, Entity};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Entity for User {
    const KIND: &'static str = "user";
    const ID_PREFIX: &'static str = "user";

    fn id(&self) -> &str {
        &self.user_id
    }

    fn assign_id(&mut self, id: String) {
        self.user_id = id;
    }

    fn apply_create_defaults(&mut self) {
        self.is_online = true;
        self.last_seen = Utc::now();
    }
}

impl Entity for Conversation {
    const KIND: &'static str = "conversation";
    const ID_PREFIX: &'static str = "conv";

    fn id(&self) -> &str {
        &self.conversation_id
    }

    fn assign_id(&mut self, id: String) {
        self.conversation_id = id;
    }

    fn apply_create_defaults(&mut self) {
        self.unread_count = 0;
        self.is_pinned = false;
        self.is_muted = false;
    }
}

impl Entity for Message {
    const KIND: &'static str = "message";
    const ID_PREFIX: &'static str = "msg";

    fn id(&self) -> &str {
        &self.message_id
    }

    fn assign_id(&mut self, id: String) {
        self.message_id = id;
    }
}

const USERS_FIXTURE: &str = include_str!("fixtures/users.json");
const CONVERSATIONS_FIXTURE: &str = include_str!("fixtures/conversations.json");
const MESSAGES_FIXTURE: &str = include_str!("fixtures/messages.json");

/// The three collections backing the chat demo.
#[derive(Debug, Clone)]
pub struct MockStore {
    pub users: Collection<User>,
    pub conversations: Collection<Conversation>,
    pub messages: Collection<Message>,
}

impl MockStore {
    /// A store with no records, mostly useful in tests.
    pub fn empty() -> Self {
        MockStore {
            users: Collection::new(300),
            conversations: Collection::new(300),
            messages: Collection::new(250),
        }
    }

    /// A store seeded from the embedded JSON fixtures.
    pub fn seeded() -> Result<Self, serde_json::Error> {
        let users: Vec<User> = serde_json::from_str(USERS_FIXTURE)?;
        let conversations: Vec<Conversation> = serde_json::from_str(CONVERSATIONS_FIXTURE)?;
        let messages: Vec<Message> = serde_json::from_str(MESSAGES_FIXTURE)?;
        info!(
            "store: seeded {} users, {} conversations, {} messages",
            users.len(),
            conversations.len(),
            messages.len()
        );
        Ok(MockStore {
            users: Collection::from_records(users, 300),
            conversations: Collection::from_records(conversations, 300),
            messages: Collection::from_records(messages, 250),
        })
    }

    /// Messages belonging to a conversation, ordered by timestamp ascending.
    pub async fn messages_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let mut messages = self
            .messages
            .find_where(|m| m.conversation_id == conversation_id)
            .await?;
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// Mark every message in a conversation that was not sent by `reader_id`
    /// as read. Returns the updated messages.
    pub async fn mark_as_read(
        &self,
        conversation_id: &str,
        reader_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        self.messages
            .update_where(
                |m| m.conversation_id == conversation_id && m.sender_id != reader_id,
                |m| m.advance_status(MessageStatus::Read),
            )
            .await
    }

    /// Flip a user's online flag, refreshing their last-seen timestamp.
    pub async fn set_online_status(
        &self,
        user_id: &str,
        is_online: bool,
    ) -> Result<User, StoreError> {
        self.users
            .update(user_id, |u| {
                u.is_online = is_online;
                u.last_seen = Utc::now();
            })
            .await
    }
}
