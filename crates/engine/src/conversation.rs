//! Conversation state.
//!
//! Each conversation is a bounded, ordered message history. The store hands
//! out one `Mutex` per conversation behind a `RwLock`ed map, so turns on the
//! same id serialize while different ids only share the brief map lookup.

use chrono::{DateTime, Utc};
use ragdesk_core::message::{ConversationId, Message, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// A bounded message history plus the metadata a front end tracks for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    messages: Vec<Message>,
    max_history: usize,
    /// Display title, if the user set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Round a history limit up to an even number of at least two, so trimming
/// always drops whole user/assistant pairs.
fn pair_bound(max_history: usize) -> usize {
    let bound = max_history.max(2);
    bound + bound % 2
}

impl Conversation {
    pub fn new(id: ConversationId, max_history: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            max_history: pair_bound(max_history),
            title: None,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.trim();
        self.updated_at = Utc::now();
    }

    /// Drop the oldest messages until the history fits.
    fn trim(&mut self) {
        if self.messages.len() > self.max_history {
            let excess = self.messages.len() - self.max_history;
            self.messages.drain(..excess);
        }
    }

    /// Remove all messages. Title, pin state and creation time survive.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }

    /// The most recent user message and the most recent assistant message.
    pub fn latest_exchange(&self) -> (Option<String>, Option<String>) {
        let latest = |role: Role| {
            self.messages
                .iter()
                .rev()
                .find(|m| m.role() == role)
                .map(|m| m.content().to_string())
        };
        (latest(Role::User), latest(Role::Assistant))
    }

    /// `ROLE: content` blocks separated by blank lines, each content cut to
    /// `max_chars` characters with a trailing `...`.
    pub fn summarize(&self, max_chars: usize) -> String {
        self.messages
            .iter()
            .map(|m| {
                let content = m.content();
                let content = match content.char_indices().nth(max_chars) {
                    Some((cut, _)) => format!("{}...", &content[..cut]),
                    None => content.to_string(),
                };
                format!("{}: {}", m.role().as_str().to_uppercase(), content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Owns every conversation, keyed by id.
pub struct ConversationStore {
    conversations: RwLock<HashMap<ConversationId, Arc<Mutex<Conversation>>>>,
    max_history: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ConversationStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            max_history: pair_bound(max_history),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Look up a conversation, creating it empty on first reference.
    async fn entry(&self, id: &ConversationId) -> Arc<Mutex<Conversation>> {
        if let Some(existing) = self.conversations.read().await.get(id) {
            return existing.clone();
        }

        let mut conversations = self.conversations.write().await;
        conversations
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(conversation = %id, "Creating conversation");
                Arc::new(Mutex::new(Conversation::new(id.clone(), self.max_history)))
            })
            .clone()
    }

    async fn existing(&self, id: &ConversationId) -> Option<Arc<Mutex<Conversation>>> {
        self.conversations.read().await.get(id).cloned()
    }

    /// Snapshot of a conversation, creating it if needed.
    pub async fn get(&self, id: &ConversationId) -> Conversation {
        self.entry(id).await.lock().await.clone()
    }

    pub async fn contains(&self, id: &ConversationId) -> bool {
        self.conversations.read().await.contains_key(id)
    }

    pub async fn append_user(&self, id: &ConversationId, text: impl Into<String>) {
        self.entry(id).await.lock().await.push(Message::user(text));
    }

    pub async fn append_assistant(&self, id: &ConversationId, text: impl Into<String>) {
        self.entry(id).await.lock().await.push(Message::assistant(text));
    }

    /// Append a user message and its reply under one lock acquisition.
    pub async fn append_turn(
        &self,
        id: &ConversationId,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) {
        let entry = self.entry(id).await;
        let mut conversation = entry.lock().await;
        conversation.push(Message::user(user));
        conversation.push(Message::assistant(assistant));
    }

    /// Copy of the message history.
    pub async fn history(&self, id: &ConversationId) -> Vec<Message> {
        self.entry(id).await.lock().await.messages().to_vec()
    }

    pub async fn clear(&self, id: &ConversationId) {
        self.entry(id).await.lock().await.clear();
    }

    pub async fn summarize(&self, id: &ConversationId, max_chars: usize) -> String {
        self.entry(id).await.lock().await.summarize(max_chars)
    }

    pub async fn latest_exchange(&self, id: &ConversationId) -> (Option<String>, Option<String>) {
        self.entry(id).await.lock().await.latest_exchange()
    }

    pub async fn set_title(&self, id: &ConversationId, title: Option<String>) {
        let entry = self.entry(id).await;
        let mut conversation = entry.lock().await;
        conversation.title = title;
        conversation.updated_at = Utc::now();
    }

    pub async fn set_pinned(&self, id: &ConversationId, pinned: bool) {
        let entry = self.entry(id).await;
        let mut conversation = entry.lock().await;
        conversation.pinned = pinned;
        conversation.updated_at = Utc::now();
    }

    /// Snapshot for an external persistence layer. Unknown ids are not created.
    pub async fn export(&self, id: &ConversationId) -> Option<Conversation> {
        let entry = self.existing(id).await?;
        let snapshot = entry.lock().await.clone();
        Some(snapshot)
    }

    /// Install a previously exported conversation, replacing any current one
    /// with the same id. The history is trimmed to its own `max_history`,
    /// rounded up to an even limit.
    pub async fn restore(&self, mut conversation: Conversation) {
        conversation.max_history = pair_bound(conversation.max_history);
        conversation.trim();
        let id = conversation.id.clone();
        self.conversations
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(conversation)));
    }

    /// Known conversation ids in sorted order.
    pub async fn ids(&self) -> Vec<ConversationId> {
        let mut ids: Vec<ConversationId> = self.conversations.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
