//! ragdesk CLI: the main entry point.
//!
//! Commands:
//! - `ask`         : Answer a single question
//! - `chat`        : Interactive question-answering session
//! - `ingest`      : Add plain-text documents to the knowledge base
//! - `clear-index` : Remove every document from the knowledge base
//! - `history`     : Show, list or reset saved conversations
//! - `onboard`     : Initialize config & index directory
//! - `doctor`      : Diagnose configuration and connectivity
//! - `completions` : Print shell completions

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragdesk",
    about = "ragdesk — IT support answers grounded in your own documentation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.ragdesk/config.toml
    #[arg(short, long, global = true, env = "RAGDESK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Conversation to continue and save into
        #[arg(short = 'c', long, default_value = "default")]
        conversation: String,

        /// Show which prompt strategy was used
        #[arg(long)]
        explain: bool,
    },

    /// Start an interactive session
    Chat {
        /// Conversation to continue and save into
        #[arg(short = 'c', long, default_value = "default")]
        conversation: String,
    },

    /// Add plain-text documents to the knowledge base
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove every document from the knowledge base
    ClearIndex {
        /// Skip the safety prompt
        #[arg(long)]
        confirm: bool,
    },

    /// Show, list or reset saved conversations
    History {
        /// Conversation to show
        #[arg(default_value = "default")]
        conversation: String,

        /// List saved conversations instead
        #[arg(short, long)]
        list: bool,

        /// Clear the conversation's messages
        #[arg(long)]
        reset: bool,
    },

    /// Initialize configuration and index directory
    Onboard,

    /// Diagnose configuration, index and endpoint health
    Doctor,

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = commands::config_path(cli.config.as_deref());
    let loaded = commands::load_config(&config_path);

    // Initialize tracing
    let debug = cli.verbose || loaded.as_ref().is_ok_and(|c| c.debug);
    let filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            conversation,
            explain,
        } => commands::ask::run(&loaded?, &question.join(" "), &conversation, explain).await?,
        Commands::Chat { conversation } => commands::chat::run(&loaded?, &conversation).await?,
        Commands::Ingest { paths } => commands::ingest::run(&loaded?, &paths).await?,
        Commands::ClearIndex { confirm } => commands::ingest::clear(&loaded?, confirm).await?,
        Commands::History {
            conversation,
            list,
            reset,
        } => commands::history::run(&loaded?, &conversation, list, reset).await?,
        Commands::Onboard => commands::onboard::run(&config_path).await?,
        Commands::Doctor => commands::doctor::run(&config_path, loaded).await?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ragdesk", &mut std::io::stdout());
        }
    }

    Ok(())
}
