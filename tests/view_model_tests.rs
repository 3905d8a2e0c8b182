// Tests for the view-model builder: pure derivation of the conversation list,
// the ordered thread, and the per-message display hints.

mod common;
use common::{at, make_conversation, make_message, make_user};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use chatterflow::chat::view_model::{
    conversation_entries, filter_conversations, format_conversation_time, format_message_time,
    message_entries, ordered_messages, show_separator,
};
use chatterflow::models::{Conversation, MessageStatus, User};

fn fixture_users() -> Vec<User> {
    vec![
        make_user("user_1", "You"),
        make_user("user_2", "Sarah Chen"),
        make_user("user_3", "Marcus Webb"),
    ]
}

fn fixture_conversations() -> Vec<Conversation> {
    vec![
        make_conversation("conv_1", "user_1", "user_2"),
        make_conversation("conv_2", "user_1", "user_3"),
        // Counterparty with no user record
        make_conversation("conv_3", "user_1", "user_9"),
    ]
}

#[test]
fn empty_query_matches_every_conversation() {
    let conversations = fixture_conversations();
    let filtered = filter_conversations(&conversations, &fixture_users(), "user_1", "");
    assert_eq!(filtered.len(), conversations.len());
}

#[test]
fn query_matches_case_insensitive_substring_of_other_name() {
    let conversations = fixture_conversations();
    let users = fixture_users();

    let filtered = filter_conversations(&conversations, &users, "user_1", "sArAh");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].conversation_id, "conv_1");

    // Substring anywhere in the name counts
    let filtered = filter_conversations(&conversations, &users, "user_1", "webb");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].conversation_id, "conv_2");

    let filtered = filter_conversations(&conversations, &users, "user_1", "nobody");
    assert!(filtered.is_empty());
}

#[test]
fn unresolved_counterparty_falls_back_to_unknown_user() {
    let conversations = fixture_conversations();
    let users = fixture_users();

    // "unknown" matches only the placeholder name
    let filtered = filter_conversations(&conversations, &users, "user_1", "unknown");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].conversation_id, "conv_3");

    let entries = conversation_entries(&conversations, &users, "user_1", "", Local::now());
    let ghost = entries
        .iter()
        .find(|e| e.conversation.conversation_id == "conv_3")
        .expect("conv_3 present");
    assert_eq!(ghost.other_user.display_name, "Unknown User");
}

#[test]
fn messages_sort_ascending_and_stably() {
    let messages = vec![
        make_message("msg_c", "conv_1", "user_1", "third", at(120)),
        make_message("msg_a", "conv_1", "user_2", "tie-first", at(0)),
        make_message("msg_x", "conv_2", "user_3", "other thread", at(60)),
        make_message("msg_b", "conv_1", "user_1", "tie-second", at(0)),
    ];

    let ordered = ordered_messages(&messages, "conv_1");
    let ids: Vec<&str> = ordered.iter().map(|m| m.message_id.as_str()).collect();
    // Equal timestamps keep their original relative order
    assert_eq!(ids, vec!["msg_a", "msg_b", "msg_c"]);
}

#[test]
fn separator_shows_for_first_message_and_gaps_over_five_minutes() {
    let messages = vec![
        make_message("msg_1", "conv_1", "user_1", "a", at(0)),
        make_message("msg_2", "conv_1", "user_2", "b", at(300)), // 5 min exactly
        make_message("msg_3", "conv_1", "user_1", "c", at(601)), // 301 s gap
    ];
    let ordered = ordered_messages(&messages, "conv_1");

    assert!(show_separator(&ordered, 0));
    // A gap of exactly 300 000 ms does not break the group
    assert!(!show_separator(&ordered, 1));
    assert!(show_separator(&ordered, 2));
}

#[test]
fn message_entries_carry_ownership_and_hints() {
    let messages = vec![
        make_message("msg_1", "conv_1", "user_2", "hi", at(0)),
        make_message("msg_2", "conv_1", "user_1", "hello", at(30)),
    ];

    let entries = message_entries(&messages, "conv_1", "user_1", Local::now());
    assert_eq!(entries.len(), 2);
    assert!(!entries[0].is_own);
    assert!(entries[1].is_own);
    assert!(entries[0].show_separator);
    assert!(!entries[1].show_separator);
    assert_eq!(entries[1].message.status, MessageStatus::Sent);
}

/// An instant on the same local calendar day as `now`, at 11:00 local time.
fn local_day_instant(day: chrono::NaiveDate) -> DateTime<Utc> {
    Local
        .from_local_datetime(&day.and_hms_opt(11, 0, 0).unwrap())
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

#[test]
fn timestamps_format_relative_to_the_evaluation_instant() {
    // Fix "now" to local noon so day arithmetic is unambiguous in any zone.
    let now = Local
        .from_local_datetime(&Local::now().date_naive().and_hms_opt(12, 0, 0).unwrap())
        .single()
        .expect("local noon");

    let today = local_day_instant(now.date_naive());
    assert_eq!(format_message_time(today, now), "11:00");
    assert_eq!(format_conversation_time(today, now), "11:00");

    let yesterday = local_day_instant(now.date_naive().pred_opt().unwrap());
    assert_eq!(format_message_time(yesterday, now), "Yesterday");
    assert_eq!(format_conversation_time(yesterday, now), "Yesterday");

    let older_day = now.date_naive() - Duration::days(10);
    let older = local_day_instant(older_day);
    assert_eq!(
        format_message_time(older, now),
        older_day.format("%d/%m/%Y").to_string()
    );
    assert_eq!(
        format_conversation_time(older, now),
        older_day.format("%d/%m").to_string()
    );
}

#[test]
fn conversation_entries_format_the_last_message_time() {
    let now = Local::now();
    let mut conversations = fixture_conversations();
    conversations[0].last_message = Some(make_message(
        "msg_1",
        "conv_1",
        "user_2",
        "latest",
        Utc::now(),
    ));

    let entries = conversation_entries(&conversations, &fixture_users(), "user_1", "", now);
    let first = &entries[0];
    assert!(first.last_message_time.is_some());
    // The other two conversations have no messages yet
    assert!(entries[1].last_message_time.is_none());
}
