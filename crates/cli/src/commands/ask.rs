//! `ragdesk ask`: Answer one question and save the turn.

use std::sync::Arc;

use ragdesk_config::AppConfig;
use ragdesk_core::message::ConversationId;
use ragdesk_engine::{AnswerSource, ConversationStore};

use super::sessions::SessionFiles;
use super::{CommandResult, build_service};

pub async fn run(
    config: &AppConfig,
    question: &str,
    conversation: &str,
    explain: bool,
) -> CommandResult {
    let store = Arc::new(ConversationStore::new(config.conversation.max_history));
    let service = build_service(config, store.clone())?;

    let id = ConversationId::from(conversation);
    let files = SessionFiles::new(SessionFiles::default_dir());
    files.restore_into(&store, &id).await;

    eprint!("  Thinking...");
    let answer = service.answer(&id, question).await;
    eprint!("\r              \r");

    println!("{}", answer.text);

    if explain {
        eprintln!();
        match &answer.source {
            AnswerSource::Canned(reply) => eprintln!("  [canned: {}]", reply.name()),
            AnswerSource::Generated {
                strategy,
                context_documents,
            } => eprintln!("  [strategy: {strategy}, context documents: {context_documents}]"),
            AnswerSource::Degraded => eprintln!("  [failed: see log output above]"),
        }
    }

    files.persist_from(&store, &id).await?;
    Ok(())
}
