//! `ragdesk history`: Inspect and reset saved conversations.

use ragdesk_config::AppConfig;
use ragdesk_core::message::ConversationId;
use ragdesk_engine::ConversationStore;

use super::CommandResult;
use super::sessions::SessionFiles;

pub async fn run(config: &AppConfig, conversation: &str, list: bool, reset: bool) -> CommandResult {
    let files = SessionFiles::new(SessionFiles::default_dir());

    if list {
        let conversations = files.list();
        if conversations.is_empty() {
            println!("   No saved conversations in {}", files.dir().display());
            return Ok(());
        }
        println!("💬 Saved conversations");
        println!("======================");
        for c in conversations {
            println!(
                "  {}{:<24} {:>3} messages  updated {}{}",
                if c.pinned { "📌 " } else { "   " },
                c.id.as_str(),
                c.len(),
                c.updated_at.format("%Y-%m-%d %H:%M"),
                c.title.as_deref().map(|t| format!("  — {t}")).unwrap_or_default(),
            );
        }
        return Ok(());
    }

    let store = ConversationStore::new(config.conversation.max_history);
    let id = ConversationId::from(conversation);
    if !files.restore_into(&store, &id).await {
        println!("   Conversation not found: {id}");
        return Ok(());
    }

    if reset {
        store.clear(&id).await;
        files.persist_from(&store, &id).await?;
        println!("✅ Conversation history has been reset.");
        return Ok(());
    }

    let snapshot = store.get(&id).await;
    println!("💬 {}", snapshot.title.as_deref().unwrap_or(id.as_str()));
    println!(
        "   created {}, {} of max {} messages",
        snapshot.created_at.format("%Y-%m-%d %H:%M"),
        snapshot.len(),
        snapshot.max_history()
    );
    println!();

    let summary = store.summarize(&id, 500).await;
    if summary.is_empty() {
        println!("   (no messages)");
    } else {
        println!("{summary}");
    }

    let (question, answer) = store.latest_exchange(&id).await;
    if let (Some(question), Some(answer)) = (question, answer) {
        println!();
        println!("   Latest question: {}", first_line(&question));
        println!("   Latest answer:   {}", first_line(&answer));
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
