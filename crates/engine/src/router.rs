//! Confidence-tiered retrieval routing.
//!
//! The router decides, per query, how much the answer may lean on the
//! knowledge base:
//!
//! 1. Small talk (weather, greetings) gets a canned reply with no retrieval.
//! 2. Otherwise the query is expanded, embedded and searched.
//! 3. Every hit is bucketed by score and the best bucket picks the strategy
//!    and the context documents.
//!
//! Strategy selection itself is the pure function [`select_strategy`]; the
//! router only adds the I/O around it.

use std::sync::Arc;

use ragdesk_config::AppConfig;
use ragdesk_core::error::RetrievalError;
use ragdesk_core::message::Message;
use ragdesk_core::retrieval::{EmbeddingProvider, VectorIndex};
use serde::Serialize;
use tracing::{debug, info};

use crate::expander::QueryExpander;
use crate::keywords::{CannedReply, canned_reply, is_domain_related};
use crate::prompt::PromptAssembler;

/// Score cut points. Scores are similarities: higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_score: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_score: 0.2,
            medium: 0.3,
            high: 0.5,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, score: f32) -> ConfidenceBucket {
        if score >= self.high {
            ConfidenceBucket::High
        } else if score >= self.medium {
            ConfidenceBucket::Medium
        } else if score >= self.min_score {
            ConfidenceBucket::Low
        } else {
            ConfidenceBucket::None
        }
    }
}

/// Relevance class of a single retrieved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
    None,
}

/// How the prompt should treat retrieved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PromptStrategy {
    HighConfidence,
    MediumConfidence,
    LowConfidence { domain_related: bool },
    Fallback { domain_related: bool },
}

impl PromptStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HighConfidence => "high_confidence",
            Self::MediumConfidence => "medium_confidence",
            Self::LowConfidence { .. } => "low_confidence",
            Self::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl std::fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A search hit with its position in the result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub text: String,
    pub score: f32,
    /// Zero-based position in the index's ranking
    pub rank: usize,
}

/// Strategy plus the documents to inject as context, in injection order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub strategy: PromptStrategy,
    pub context: Vec<String>,
}

/// Choose a strategy from ranked documents. Pure: no I/O, no state.
pub fn select_strategy(
    query: &str,
    documents: &[RetrievedDocument],
    thresholds: &Thresholds,
) -> RoutingDecision {
    let best = documents
        .iter()
        .map(|d| d.score)
        .fold(f32::NEG_INFINITY, f32::max);

    if documents.is_empty() || best < thresholds.min_score {
        return RoutingDecision {
            strategy: PromptStrategy::Fallback {
                domain_related: is_domain_related(query),
            },
            context: Vec::new(),
        };
    }

    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();
    for doc in documents {
        match thresholds.classify(doc.score) {
            ConfidenceBucket::High => high.push(doc.text.clone()),
            ConfidenceBucket::Medium => medium.push(doc.text.clone()),
            ConfidenceBucket::Low => low.push(doc.text.clone()),
            ConfidenceBucket::None => {}
        }
    }

    if !high.is_empty() {
        RoutingDecision {
            strategy: PromptStrategy::HighConfidence,
            context: high,
        }
    } else if !medium.is_empty() {
        medium.extend(low);
        RoutingDecision {
            strategy: PromptStrategy::MediumConfidence,
            context: medium,
        }
    } else {
        RoutingDecision {
            strategy: PromptStrategy::LowConfidence {
                domain_related: is_domain_related(query),
            },
            context: low,
        }
    }
}

/// Retrieval settings for the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub thresholds: Thresholds,
    pub top_k: usize,
    pub history_window: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            top_k: 5,
            history_window: 10,
        }
    }
}

impl From<&AppConfig> for RouterConfig {
    fn from(config: &AppConfig) -> Self {
        let r = &config.retrieval;
        Self {
            thresholds: Thresholds {
                min_score: r.min_score,
                medium: r.medium_threshold,
                high: r.high_threshold,
            },
            top_k: r.top_k,
            history_window: config.conversation.max_history,
        }
    }
}

/// A fully assembled plan for one completion call.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub strategy: PromptStrategy,
    pub context_documents: Vec<String>,
    pub retrieved: Vec<RetrievedDocument>,
    pub messages: Vec<Message>,
}

/// Outcome of routing one query.
#[derive(Debug, Clone)]
pub enum Route {
    /// Answer immediately with a fixed reply.
    Canned(CannedReply),
    /// Send the assembled messages to the completion client.
    Plan(RoutePlan),
}

pub struct RetrievalRouter {
    expander: QueryExpander,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    assembler: PromptAssembler,
    config: RouterConfig,
}

impl RetrievalRouter {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: RouterConfig,
    ) -> Self {
        Self {
            expander: QueryExpander::new(),
            embedder,
            index,
            assembler: PromptAssembler::new(config.history_window),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Expand, embed and search. Errors propagate untouched; nothing here retries.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        let expanded = self.expander.expand(query);
        debug!(expanded = %expanded, "Query expanded");

        let embedding = self.embedder.embed(&expanded).await?;
        let hits = self.index.query(&embedding, self.config.top_k).await?;

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, hit)| RetrievedDocument {
                text: hit.text,
                score: hit.score,
                rank,
            })
            .collect())
    }

    /// Route a query against the conversation history that precedes it.
    pub async fn route(&self, query: &str, history: &[Message]) -> Result<Route, RetrievalError> {
        if let Some(reply) = canned_reply(query) {
            info!(reply = reply.name(), "Short-circuit reply, skipping retrieval");
            return Ok(Route::Canned(reply));
        }

        let retrieved = self.retrieve(query).await?;
        let decision = select_strategy(query, &retrieved, &self.config.thresholds);

        info!(
            strategy = %decision.strategy,
            retrieved = retrieved.len(),
            context = decision.context.len(),
            top_score = retrieved.first().map(|d| d.score),
            "Query routed"
        );

        let messages =
            self.assembler
                .assemble(&decision.strategy, query, &decision.context, history);

        Ok(Route::Plan(RoutePlan {
            strategy: decision.strategy,
            context_documents: decision.context,
            retrieved,
            messages,
        }))
    }
}
