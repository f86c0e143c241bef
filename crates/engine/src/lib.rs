//! The ragdesk routing engine.
//!
//! A question flows through the engine like this:
//!
//! 1. **Short-circuit** small talk with a canned reply
//! 2. **Expand** the query with domain synonyms
//! 3. **Retrieve** the top-k chunks from the vector index
//! 4. **Route** by confidence: high, medium, low or fallback
//! 5. **Assemble** the prompt: template, context, history, query
//! 6. **Complete** via the configured client and record the turn
//!
//! Steps 1 to 5 live in [`RetrievalRouter`]; step 6 and all failure handling
//! live in [`QaService`].

pub mod conversation;
pub mod expander;
pub mod keywords;
pub mod prompt;
pub mod router;
pub mod service;

#[cfg(test)]
mod test_helpers;

pub use conversation::{Conversation, ConversationStore};
pub use expander::QueryExpander;
pub use keywords::{CannedReply, canned_reply, is_domain_related};
pub use prompt::PromptAssembler;
pub use router::{
    ConfidenceBucket, PromptStrategy, RetrievalRouter, RetrievedDocument, Route, RoutePlan,
    RouterConfig, RoutingDecision, Thresholds, select_strategy,
};
pub use service::{Answer, AnswerSource, GRACEFUL_ERROR_MESSAGE, GenerationSettings, QaService};
