use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;
use tokio::time::{sleep, Duration};

mod utils;

use chatterflow::chat::{ChatSession, NoticeKind};
use chatterflow::store::MockStore;

/// Command line arguments for the ChatterFlow demo
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ChatterFlow: a chat demo over a mock in-memory data store.",
    long_about = "ChatterFlow is a terminal demo of a chat session backed by fixture data.\n\n\
    Commands at the prompt:\n\
    /open <n>      Open the n-th conversation from the list\n\
    /search <text> Filter the conversation list by contact name\n\
    /close         Leave the active conversation\n\
    /quit          Exit\n\
    Anything else is sent as a message to the active conversation."
)]
struct Args {
    /// Write logs to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

const CURRENT_USER: &str = "user_1";

fn print_conversations(session: &ChatSession) {
    let snapshot = session.snapshot();
    if snapshot.conversations.is_empty() {
        println!("  (no conversations)");
        return;
    }
    for (i, entry) in snapshot.conversations.iter().enumerate() {
        let last = entry
            .conversation
            .last_message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("(no messages yet)");
        let time = entry.last_message_time.as_deref().unwrap_or("");
        let presence = if entry.other_user.is_online { "●" } else { "○" };
        println!(
            "  {}. {} {:<14} {:>8}  {}",
            i + 1,
            presence,
            entry.other_user.display_name,
            time,
            last
        );
    }
}

fn print_thread(session: &ChatSession) {
    let snapshot = session.snapshot();
    for entry in &snapshot.messages {
        if entry.show_separator {
            println!("      --- {} ---", entry.display_time);
        }
        let who = if entry.is_own { "you" } else { "them" };
        println!("  [{}] {}", who, entry.message.content);
    }
    if snapshot.is_typing {
        println!("  ...typing...");
    }
}

fn print_notices(session: &mut ChatSession) {
    for notice in session.take_notices() {
        match notice.kind {
            NoticeKind::Success => println!("  ✓ {}", notice.text),
            NoticeKind::Error => println!("  ✗ {}", notice.text),
        }
    }
}

/// Wait out the simulated reply, echoing the typing indicator and the reply
/// as they arrive.
async fn watch_for_reply(session: &mut ChatSession) {
    let mut was_typing = false;
    let mut before = session.messages().len();
    for _ in 0..18 {
        sleep(Duration::from_millis(200)).await;
        session.drain_events();
        let snapshot = session.snapshot();
        if snapshot.is_typing && !was_typing {
            println!("  ...typing...");
            was_typing = true;
        }
        let count = session.messages().len();
        if count > before {
            before = count;
            if let Some(entry) = snapshot.messages.last() {
                if !entry.is_own {
                    println!("  [them] {}", entry.message.content);
                    break;
                }
            }
        }
    }
    print_notices(session);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    utils::setup_logging(args.log_file.as_deref().and_then(|p| p.to_str()), level)?;

    info!("ChatterFlow demo starting up");

    let store = MockStore::seeded()?;
    let mut session = ChatSession::new(store, CURRENT_USER);

    println!("Loading conversations...");
    session.load().await;
    print_notices(&mut session);

    println!("\nConversations:");
    print_conversations(&session);
    println!("\nType /open <n> to open a conversation, /quit to exit.");

    loop {
        let line = utils::read_line()?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix("/open ") {
            let index: usize = match rest.trim().parse() {
                Ok(n) => n,
                Err(_) => {
                    println!("  usage: /open <number>");
                    continue;
                }
            };
            let snapshot = session.snapshot();
            match snapshot.conversations.get(index.saturating_sub(1)) {
                Some(entry) => {
                    let id = entry.conversation.conversation_id.clone();
                    let name = entry.other_user.display_name.clone();
                    session.select_conversation(Some(&id));
                    println!("\n--- {} ---", name);
                    print_thread(&session);
                }
                None => println!("  no conversation #{}", index),
            }
        } else if let Some(query) = input.strip_prefix("/search ") {
            session.set_search_query(query.trim());
            println!("\nConversations matching '{}':", query.trim());
            print_conversations(&session);
        } else if input == "/close" {
            session.select_conversation(None);
            session.set_search_query("");
            println!("\nConversations:");
            print_conversations(&session);
        } else if input == "/quit" {
            break;
        } else if input.starts_with('/') {
            println!("  unknown command: {}", input);
        } else {
            if session.active_conversation().is_none() {
                println!("  open a conversation first (/open <n>)");
                continue;
            }
            session.send_message(input).await;
            print_notices(&mut session);
            watch_for_reply(&mut session).await;
        }
    }

    info!("ChatterFlow demo shutting down");
    Ok(())
}
