//! `ragdesk chat`: Interactive question-answering session.
//!
//! Slash commands inside the session:
//! - `/reset`   : clear this conversation
//! - `/summary` : print the conversation so far
//! - `/title T` : set the conversation title
//! - `/pin`     : toggle the pinned flag
//! - `/exit`    : leave (also `exit`, `quit`, Ctrl+D)

use std::io::Write;
use std::sync::Arc;

use ragdesk_config::AppConfig;
use ragdesk_core::message::ConversationId;
use ragdesk_engine::{ConversationStore, QaService};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::sessions::SessionFiles;
use super::{CommandResult, build_service};

/// What to do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Reset,
    Summary,
    Title(&'a str),
    Pin,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if matches!(line, "exit" | "quit") {
        return Input::Exit;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line);
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "exit" | "quit" => Input::Exit,
        "reset" => Input::Reset,
        "summary" => Input::Summary,
        "title" => Input::Title(rest.trim()),
        "pin" => Input::Pin,
        _ => Input::Unknown(name),
    }
}

pub async fn run(config: &AppConfig, conversation: &str) -> CommandResult {
    let store = Arc::new(ConversationStore::new(config.conversation.max_history));
    let service = build_service(config, store.clone())?;

    let id = ConversationId::from(conversation);
    let files = SessionFiles::new(SessionFiles::default_dir());
    let resumed = files.restore_into(&store, &id).await;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         ragdesk — Interactive Session        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:        {}", config.completion.model);
    println!("  Embeddings:   {}", config.embedding.provider);
    println!("  Index:        {}", config.index_file().display());
    println!(
        "  Conversation: {id}{}",
        if resumed { " (resumed)" } else { "" }
    );
    println!();
    println!("  Ask a question and press Enter.");
    println!("  Commands: /reset  /summary  /title <text>  /pin  /exit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::Reset => println!("  {}\n", service.reset(&id).await),
            Input::Summary => print_summary(&service, &id).await,
            Input::Title(title) => {
                let title = (!title.is_empty()).then(|| title.to_string());
                store.set_title(&id, title).await;
                println!("  Title updated.\n");
            }
            Input::Pin => {
                let pinned = !store.get(&id).await.pinned;
                store.set_pinned(&id, pinned).await;
                println!("  {}\n", if pinned { "Pinned." } else { "Unpinned." });
            }
            Input::Unknown(name) => {
                println!("  Unknown command: /{name}\n");
                continue;
            }
            Input::Question(question) => {
                eprint!("  ...");
                let answer = service.answer(&id, question).await;
                eprint!("\r     \r");
                println!();
                for line in answer.text.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
        }

        files.persist_from(&store, &id).await?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

async fn print_summary(service: &QaService, id: &ConversationId) {
    let summary = service.summary(id).await;
    if summary.is_empty() {
        println!("  (no messages yet)\n");
        return;
    }
    for line in summary.lines() {
        println!("  {line}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(parse_input("  vpn drops  "), Input::Question("vpn drops"));
    }

    #[test]
    fn exit_words() {
        assert_eq!(parse_input("exit"), Input::Exit);
        assert_eq!(parse_input("quit"), Input::Exit);
        assert_eq!(parse_input("/exit"), Input::Exit);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/reset"), Input::Reset);
        assert_eq!(parse_input("/summary"), Input::Summary);
        assert_eq!(parse_input("/pin"), Input::Pin);
        assert_eq!(parse_input("/title  Printer woes "), Input::Title("Printer woes"));
        assert_eq!(parse_input("/bogus"), Input::Unknown("bogus"));
        assert_eq!(parse_input("   "), Input::Empty);
    }
}
