//! The question-answering boundary.
//!
//! `QaService` runs one turn end to end: route, complete, record. It is the
//! only place where retrieval and completion failures are caught. A failed
//! turn is logged and replaced by a fixed apology, and the conversation is
//! left exactly as it was before the query.

use std::sync::Arc;

use ragdesk_config::CompletionConfig;
use ragdesk_core::message::ConversationId;
use ragdesk_core::provider::{CompletionClient, CompletionRequest};
use ragdesk_core::{Error, Result};
use tracing::{info, warn};

use crate::conversation::ConversationStore;
use crate::keywords::CannedReply;
use crate::router::{PromptStrategy, RetrievalRouter, Route};

pub const GRACEFUL_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

pub const RESET_MESSAGE: &str = "Conversation history has been reset.";

pub const NOT_FOUND_MESSAGE: &str = "Conversation not found.";

/// Per-message character limit used by [`QaService::summary`].
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Model parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: Some(1024),
        }
    }
}

impl From<&CompletionConfig> for GenerationSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        }
    }
}

/// Where an answer came from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSource {
    Canned(CannedReply),
    Generated {
        strategy: PromptStrategy,
        context_documents: usize,
    },
    /// The turn failed and the text is the fixed apology.
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

pub struct QaService {
    router: RetrievalRouter,
    client: Arc<dyn CompletionClient>,
    store: Arc<ConversationStore>,
    settings: GenerationSettings,
}

impl QaService {
    pub fn new(
        router: RetrievalRouter,
        client: Arc<dyn CompletionClient>,
        store: Arc<ConversationStore>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            router,
            client,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Answer a query, surfacing failures to the caller.
    ///
    /// The user message and the reply are recorded together only after the
    /// whole turn has succeeded.
    pub async fn try_answer(&self, id: &ConversationId, query: &str) -> Result<Answer> {
        let history = self.store.history(id).await;

        match self.router.route(query, &history).await? {
            Route::Canned(reply) => {
                self.store.append_turn(id, query, reply.text()).await;
                Ok(Answer {
                    text: reply.text().to_string(),
                    source: AnswerSource::Canned(reply),
                })
            }
            Route::Plan(plan) => {
                let mut request = CompletionRequest::new(&self.settings.model, plan.messages);
                request.temperature = self.settings.temperature;
                request.max_tokens = self.settings.max_tokens;

                let response = self.client.complete(request).await?;
                if let Some(usage) = &response.usage {
                    info!(
                        conversation = %id,
                        model = %response.model,
                        total_tokens = usage.total_tokens,
                        "Completion received"
                    );
                }

                self.store.append_turn(id, query, response.content.as_str()).await;
                Ok(Answer {
                    text: response.content,
                    source: AnswerSource::Generated {
                        strategy: plan.strategy,
                        context_documents: plan.context_documents.len(),
                    },
                })
            }
        }
    }

    /// Answer a query. Failures become [`GRACEFUL_ERROR_MESSAGE`].
    pub async fn answer(&self, id: &ConversationId, query: &str) -> Answer {
        match self.try_answer(id, query).await {
            Ok(answer) => answer,
            Err(e) => {
                match &e {
                    Error::Completion(completion) => warn!(
                        conversation = %id,
                        kind = ?completion.kind(),
                        error = %e,
                        "Query failed"
                    ),
                    _ => warn!(conversation = %id, error = %e, "Query failed"),
                }
                Answer {
                    text: GRACEFUL_ERROR_MESSAGE.to_string(),
                    source: AnswerSource::Degraded,
                }
            }
        }
    }

    /// Clear a conversation's history, creating it if it is unknown.
    pub async fn reset(&self, id: &ConversationId) -> &'static str {
        self.store.clear(id).await;
        info!(conversation = %id, "Conversation reset");
        RESET_MESSAGE
    }

    pub async fn summary(&self, id: &ConversationId) -> String {
        if !self.store.contains(id).await {
            return NOT_FOUND_MESSAGE.to_string();
        }
        self.store.summarize(id, SUMMARY_MAX_CHARS).await
    }
}
