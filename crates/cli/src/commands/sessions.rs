//! Conversation files: one JSON document per conversation under
//! `~/.ragdesk/conversations/`.

use std::path::{Path, PathBuf};

use ragdesk_config::AppConfig;
use ragdesk_core::message::ConversationId;
use ragdesk_engine::{Conversation, ConversationStore};
use tracing::{debug, warn};

pub struct SessionFiles {
    dir: PathBuf,
}

impl SessionFiles {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_dir() -> PathBuf {
        AppConfig::config_dir().join("conversations")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &ConversationId) -> PathBuf {
        let safe: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Read a saved conversation. Missing or unreadable files yield `None`.
    pub fn load(&self, id: &ConversationId) -> Option<Conversation> {
        let path = self.path_for(id);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable conversation file");
                None
            }
        }
    }

    pub fn save(&self, conversation: &Conversation) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(conversation)?;
        let path = self.path_for(&conversation.id);
        std::fs::write(&path, json)?;
        debug!(path = %path.display(), "Conversation saved");
        Ok(())
    }

    /// Saved conversations, most recently updated first.
    pub fn list(&self) -> Vec<Conversation> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut conversations: Vec<Conversation> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .filter_map(|path| std::fs::read_to_string(path).ok())
            .filter_map(|content| serde_json::from_str(&content).ok())
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations
    }

    /// Restore a saved conversation into the store, if one exists.
    pub async fn restore_into(&self, store: &ConversationStore, id: &ConversationId) -> bool {
        match self.load(id) {
            Some(conversation) => {
                store.restore(conversation).await;
                true
            }
            None => false,
        }
    }

    /// Export a conversation from the store and write it out.
    pub async fn persist_from(
        &self,
        store: &ConversationStore,
        id: &ConversationId,
    ) -> std::io::Result<()> {
        match store.export(id).await {
            Some(conversation) => self.save(&conversation),
            None => Ok(()),
        }
    }
}
