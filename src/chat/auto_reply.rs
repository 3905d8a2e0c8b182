// Simulated counter-reply: after a send, the other participant "types" for a
// moment and then answers with a canned line. Runs as one spawned task per
// send; the session keeps the JoinHandle keyed by conversation id so switching
// away (or sending again) can abort a pending reply instead of letting it fire
// against a conversation the user has left.

use chrono::Utc;
use log::{debug, warn};
use rand::seq::SliceRandom;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::models::{Message, MessageKind, MessageStatus};
use crate::store::MockStore;

use super::SessionEvent;

/// Delay from the send until the typing indicator appears.
pub const TYPING_DELAY: Duration = Duration::from_millis(1_000);
/// Delay from the send until the reply lands, measured from the original send.
pub const REPLY_DELAY: Duration = Duration::from_millis(3_000);

pub const CANNED_REPLIES: [&str; 10] = [
    "That sounds great! 👍",
    "I totally agree with you",
    "Interesting point!",
    "Thanks for sharing that",
    "Let me think about it 🤔",
    "Absolutely! 💯",
    "That makes sense",
    "I appreciate you telling me",
    "Good to know!",
    "Thanks for the update",
];

/// Pick a reply line uniformly at random.
pub fn pick_reply() -> &'static str {
    let mut rng = rand::thread_rng();
    // The slice is non-empty, so choose cannot return None.
    CANNED_REPLIES.choose(&mut rng).copied().unwrap_or(CANNED_REPLIES[0])
}

/// Spawn the reply timeline for one send. Emits `TypingStarted` after
/// [`TYPING_DELAY`], then persists and emits the reply at [`REPLY_DELAY`].
pub fn schedule_reply(
    store: MockStore,
    events: UnboundedSender<SessionEvent>,
    conversation_id: String,
    replier_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(TYPING_DELAY).await;
        let _ = events.send(SessionEvent::TypingStarted {
            conversation_id: conversation_id.clone(),
        });

        sleep(REPLY_DELAY - TYPING_DELAY).await;
        let reply = Message {
            message_id: String::new(),
            conversation_id: conversation_id.clone(),
            sender_id: replier_id,
            content: pick_reply().to_string(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
            status: MessageStatus::Delivered,
        };
        match store.messages.create(reply).await {
            Ok(message) => {
                debug!("auto-reply delivered to {}", conversation_id);
                let _ = events.send(SessionEvent::ReplyDelivered {
                    conversation_id,
                    message,
                });
            }
            Err(e) => {
                warn!("auto-reply for {} failed to persist: {}", conversation_id, e);
                let _ = events.send(SessionEvent::ReplyFailed { conversation_id });
            }
        }
    })
}
