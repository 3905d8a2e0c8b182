// View-model derivation: everything here is a pure function of the collections
// handed in plus, for time formatting, an explicit evaluation instant. No state
// is retained between calls.

use chrono::{DateTime, Local, Utc};

use crate::models::{Conversation, Message, User};

/// Gap between consecutive messages above which a time separator is shown.
pub const SEPARATOR_GAP_MS: i64 = 300_000;

/// One row of the conversation list.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub conversation: Conversation,
    /// The resolved other participant, or the "Unknown User" placeholder.
    pub other_user: User,
    /// Formatted time of the last message, when there is one.
    pub last_message_time: Option<String>,
}

/// One message in the active thread, with its display hints.
#[derive(Debug, Clone)]
pub struct MessageEntry {
    pub message: Message,
    /// Sent by the current user; drives left/right placement and whether the
    /// delivery-status icon is shown at all.
    pub is_own: bool,
    /// Show a time separator above this message.
    pub show_separator: bool,
    pub display_time: String,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct ChatSnapshot {
    pub conversations: Vec<ConversationEntry>,
    pub messages: Vec<MessageEntry>,
    /// The other participant of the active conversation is "typing".
    pub is_typing: bool,
}

/// Look a user up by id, falling back to the placeholder when unresolved.
pub fn resolve_user(users: &[User], user_id: Option<&str>) -> User {
    user_id
        .and_then(|id| users.iter().find(|u| u.user_id == id))
        .cloned()
        .unwrap_or_else(User::unknown)
}

/// Conversations whose other participant's display name contains `query`,
/// case-insensitively. An empty query matches everything. Relative order is
/// preserved.
pub fn filter_conversations<'a>(
    conversations: &'a [Conversation],
    users: &[User],
    current_user_id: &str,
    query: &str,
) -> Vec<&'a Conversation> {
    let needle = query.to_lowercase();
    conversations
        .iter()
        .filter(|c| {
            let other = resolve_user(users, c.other_participant(current_user_id));
            other.display_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Messages of one conversation, ascending by timestamp. The sort is stable,
/// so equal timestamps keep their original relative order.
pub fn ordered_messages<'a>(messages: &'a [Message], conversation_id: &str) -> Vec<&'a Message> {
    let mut result: Vec<&Message> = messages
        .iter()
        .filter(|m| m.conversation_id == conversation_id)
        .collect();
    result.sort_by_key(|m| m.timestamp);
    result
}

/// Whether a separator is shown above the message at `index` of an ordered
/// sequence: always for the first message, otherwise when the gap to the
/// previous one exceeds five minutes.
pub fn show_separator(ordered: &[&Message], index: usize) -> bool {
    match index.checked_sub(1) {
        None => true,
        Some(prev) => {
            let gap = ordered[index].timestamp - ordered[prev].timestamp;
            gap.num_milliseconds() > SEPARATOR_GAP_MS
        }
    }
}

/// `HH:mm` today, `Yesterday` for the previous calendar day, `dd/MM/yyyy`
/// otherwise. Used in the message detail view.
pub fn format_message_time(timestamp: DateTime<Utc>, now: DateTime<Local>) -> String {
    format_relative(timestamp, now, "%d/%m/%Y")
}

/// Like [`format_message_time`] but with the short `dd/MM` form used in the
/// conversation list.
pub fn format_conversation_time(timestamp: DateTime<Utc>, now: DateTime<Local>) -> String {
    format_relative(timestamp, now, "%d/%m")
}

fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Local>, older_fmt: &str) -> String {
    let local = timestamp.with_timezone(&now.timezone());
    let day = local.date_naive();
    let today = now.date_naive();
    if day == today {
        local.format("%H:%M").to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        local.format(older_fmt).to_string()
    }
}

/// Build the conversation-list rows for the given search query.
pub fn conversation_entries(
    conversations: &[Conversation],
    users: &[User],
    current_user_id: &str,
    query: &str,
    now: DateTime<Local>,
) -> Vec<ConversationEntry> {
    filter_conversations(conversations, users, current_user_id, query)
        .into_iter()
        .map(|c| ConversationEntry {
            other_user: resolve_user(users, c.other_participant(current_user_id)),
            last_message_time: c
                .last_message
                .as_ref()
                .map(|m| format_conversation_time(m.timestamp, now)),
            conversation: c.clone(),
        })
        .collect()
}

/// Build the ordered message rows for one conversation.
pub fn message_entries(
    messages: &[Message],
    conversation_id: &str,
    current_user_id: &str,
    now: DateTime<Local>,
) -> Vec<MessageEntry> {
    let ordered = ordered_messages(messages, conversation_id);
    ordered
        .iter()
        .enumerate()
        .map(|(index, m)| MessageEntry {
            is_own: m.sender_id == current_user_id,
            show_separator: show_separator(&ordered, index),
            display_time: format_message_time(m.timestamp, now),
            message: (*m).clone(),
        })
        .collect()
}