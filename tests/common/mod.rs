// Common test utilities shared by the integration tests.
#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::LevelFilter;

use chatterflow::chat::ChatSession;
use chatterflow::models::{Conversation, Message, MessageKind, MessageStatus, User};
use chatterflow::store::collection::Collection;
use chatterflow::store::MockStore;

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// A fixed instant all relative timestamps in the tests hang off.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
}

/// `base_time` shifted by a number of seconds.
pub fn at(seconds: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(seconds)
}

pub fn make_user(user_id: &str, display_name: &str) -> User {
    User {
        user_id: user_id.to_string(),
        display_name: display_name.to_string(),
        profile_photo: None,
        is_online: true,
        last_seen: base_time(),
    }
}

pub fn make_conversation(conversation_id: &str, a: &str, b: &str) -> Conversation {
    Conversation {
        conversation_id: conversation_id.to_string(),
        participants: vec![a.to_string(), b.to_string()],
        last_message: None,
        unread_count: 0,
        is_pinned: false,
        is_muted: false,
    }
}

pub fn make_message(
    message_id: &str,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
    timestamp: DateTime<Utc>,
) -> Message {
    Message {
        message_id: message_id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: sender_id.to_string(),
        content: content.to_string(),
        kind: MessageKind::Text,
        timestamp,
        status: MessageStatus::Sent,
    }
}

/// A small store with two contacts and two conversations for user_1.
pub fn test_store() -> MockStore {
    MockStore {
        users: Collection::from_records(
            vec![
                make_user("user_1", "You"),
                make_user("user_2", "Sarah Chen"),
                make_user("user_3", "Marcus Webb"),
            ],
            300,
        ),
        conversations: Collection::from_records(
            vec![
                make_conversation("conv_1", "user_1", "user_2"),
                make_conversation("conv_2", "user_1", "user_3"),
            ],
            300,
        ),
        messages: Collection::from_records(Vec::new(), 250),
    }
}

/// A loaded session for user_1 over [`test_store`].
pub async fn test_session() -> ChatSession {
    setup_logging();
    let mut session = ChatSession::new(test_store(), "user_1");
    session.load().await;
    session
}
