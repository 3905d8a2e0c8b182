// ChatterFlow core: session state plus the message dispatch pipeline.
//
// The session is the single logical writer over the loaded collections. All
// work happens either in direct response to an intent (select, search, send)
// or when queued simulated-reply events are drained. Spawned reply tasks never
// touch session state directly; they report back over an mpsc channel.

pub mod auto_reply;
pub mod view_model;

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{Conversation, Message, MessageKind, MessageStatus, User};
use crate::store::MockStore;

pub use view_model::{ChatSnapshot, ConversationEntry, MessageEntry};

/// Events emitted by the simulated-reply tasks, applied by `drain_events`.
#[derive(Debug)]
pub enum SessionEvent {
    TypingStarted { conversation_id: String },
    ReplyDelivered { conversation_id: String, message: Message },
    ReplyFailed { conversation_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient user-visible notification (a toast, in UI terms).
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: &str) -> Self {
        Notice {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    fn error(text: &str) -> Self {
        Notice {
            kind: NoticeKind::Error,
            text: text.to_string(),
        }
    }
}

pub struct ChatSession {
    store: MockStore,
    current_user_id: String,
    users: Vec<User>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    active_conversation: Option<String>,
    search_query: String,
    /// Conversation whose other participant is currently "typing", if any.
    typing_in: Option<String>,
    notices: Vec<Notice>,
    /// Pending simulated-reply tasks, keyed by conversation id so they can be
    /// aborted when that conversation is left or superseded.
    reply_tasks: HashMap<String, JoinHandle<()>>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl ChatSession {
    pub fn new(store: MockStore, current_user_id: &str) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        ChatSession {
            store,
            current_user_id: current_user_id.to_string(),
            users: Vec::new(),
            conversations: Vec::new(),
            messages: Vec::new(),
            active_conversation: None,
            search_query: String::new(),
            typing_in: None,
            notices: Vec::new(),
            reply_tasks: HashMap::new(),
            event_tx,
            event_rx,
        }
    }

    /// Fetch all three collections concurrently. On failure the view stays
    /// empty and a notice is surfaced; the session remains usable.
    pub async fn load(&mut self) {
        let loaded = tokio::try_join!(
            self.store.conversations.get_all(),
            self.store.users.get_all(),
            self.store.messages.get_all(),
        );
        match loaded {
            Ok((conversations, users, messages)) => {
                info!(
                    "loaded {} conversations, {} users, {} messages",
                    conversations.len(),
                    users.len(),
                    messages.len()
                );
                self.conversations = conversations;
                self.users = users;
                self.messages = messages;
            }
            Err(e) => {
                error!("initial load failed: {}", e);
                self.notices.push(Notice::error("Failed to load conversations"));
            }
        }
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active_conversation.as_deref()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    /// Make a conversation active (or none). Leaving a conversation aborts its
    /// pending simulated reply and drops a typing indicator attributed to it,
    /// so neither can land on a thread the user is no longer looking at.
    pub fn select_conversation(&mut self, conversation_id: Option<&str>) {
        let previous = self.active_conversation.take();
        self.active_conversation = conversation_id.map(|id| id.to_string());

        if let Some(prev) = previous {
            if self.active_conversation.as_deref() != Some(prev.as_str()) {
                if let Some(task) = self.reply_tasks.remove(&prev) {
                    debug!("canceling pending reply for {}", prev);
                    task.abort();
                }
                if self.typing_in.as_deref() == Some(prev.as_str()) {
                    self.typing_in = None;
                }
            }
        }
    }

    /// Dispatch a user-authored message to the active conversation.
    ///
    /// Blank text or no active conversation is a silent no-op. The message is
    /// persisted first, then the conversation's `last_message` is updated; if
    /// the conversation update fails the message is deleted again so a failed
    /// send never leaves half its effects behind. A successful send schedules
    /// the simulated counter-reply.
    pub async fn send_message(&mut self, raw_text: &str) {
        let content = raw_text.trim();
        if content.is_empty() {
            debug!("ignoring send with empty text");
            return;
        }
        let conversation_id = match &self.active_conversation {
            Some(id) => id.clone(),
            None => {
                debug!("ignoring send with no active conversation");
                return;
            }
        };

        let draft = Message {
            message_id: String::new(),
            conversation_id: conversation_id.clone(),
            sender_id: self.current_user_id.clone(),
            content: content.to_string(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
            status: MessageStatus::Sent,
        };

        let created = match self.store.messages.create(draft).await {
            Ok(message) => message,
            Err(e) => {
                error!("message create failed: {}", e);
                self.notices.push(Notice::error("Failed to send message"));
                return;
            }
        };

        let last = created.clone();
        let updated = self
            .store
            .conversations
            .update(&conversation_id, move |c| c.last_message = Some(last))
            .await;
        let updated = match updated {
            Ok(conversation) => conversation,
            Err(e) => {
                error!("conversation update failed: {}", e);
                // Roll the message back so the send has no partial effect.
                if let Err(e) = self.store.messages.delete(&created.message_id).await {
                    warn!("rollback of {} failed: {}", created.message_id, e);
                }
                self.notices.push(Notice::error("Failed to send message"));
                return;
            }
        };

        self.messages.push(created);
        if let Some(local) = self
            .conversations
            .iter_mut()
            .find(|c| c.conversation_id == conversation_id)
        {
            *local = updated.clone();
        }
        self.notices.push(Notice::success("Message sent"));

        let replier = match updated.other_participant(&self.current_user_id) {
            Some(id) => id.to_string(),
            None => {
                warn!("no counterparty in {}, skipping auto-reply", conversation_id);
                return;
            }
        };
        let task = auto_reply::schedule_reply(
            self.store.clone(),
            self.event_tx.clone(),
            conversation_id.clone(),
            replier,
        );
        // A newer send supersedes any reply still pending for this thread.
        if let Some(old) = self.reply_tasks.insert(conversation_id, task) {
            old.abort();
        }
    }

    /// Apply every queued simulated-reply event.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                SessionEvent::TypingStarted { conversation_id } => {
                    // A typing indicator for a conversation the user has left
                    // would be misattributed; drop it.
                    if self.active_conversation.as_deref() == Some(conversation_id.as_str()) {
                        self.typing_in = Some(conversation_id);
                    }
                }
                SessionEvent::ReplyDelivered {
                    conversation_id,
                    message,
                } => {
                    if self.typing_in.as_deref() == Some(conversation_id.as_str()) {
                        self.typing_in = None;
                    }
                    self.reply_tasks.remove(&conversation_id);
                    self.messages.push(message);
                }
                SessionEvent::ReplyFailed { conversation_id } => {
                    if self.typing_in.as_deref() == Some(conversation_id.as_str()) {
                        self.typing_in = None;
                    }
                    self.reply_tasks.remove(&conversation_id);
                    self.notices.push(Notice::error("Failed to receive reply"));
                }
            }
        }
    }

    /// Read-only view of the current state, evaluated at `now`.
    pub fn snapshot_at(&self, now: DateTime<Local>) -> ChatSnapshot {
        let conversations = view_model::conversation_entries(
            &self.conversations,
            &self.users,
            &self.current_user_id,
            &self.search_query,
            now,
        );
        let messages = match &self.active_conversation {
            Some(id) => {
                view_model::message_entries(&self.messages, id, &self.current_user_id, now)
            }
            None => Vec::new(),
        };
        let is_typing = match (&self.typing_in, &self.active_conversation) {
            (Some(t), Some(a)) => t == a,
            _ => false,
        };
        ChatSnapshot {
            conversations,
            messages,
            is_typing,
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_at(Local::now())
    }

    /// Drain the transient notification queue.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for (_, task) in self.reply_tasks.drain() {
            task.abort();
        }
    }
}
