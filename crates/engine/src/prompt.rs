//! Prompt assembly.
//!
//! Turns a routing decision into the exact message sequence sent to the
//! completion client:
//!
//! 1. **Tier template**: how strictly the model must stick to the context
//! 2. **Context block**: numbered documents plus a tier instruction
//! 3. **History window**: the last N messages of the conversation
//! 4. **User query**: the raw, unexpanded question
//!
//! Fallback prompts replace the context block with an optional domain note.
//! Assembly is deterministic: identical inputs give identical output.

use ragdesk_core::message::Message;

use crate::router::PromptStrategy;

pub const HIGH_CONFIDENCE_TEMPLATE: &str = "\
You are an IT Support Assistant that primarily uses information from the provided context.

When responding:
1. Prioritize information explicitly stated in the CONTEXT section
2. Present information clearly and in a helpful format
3. If you need to reference material from the context, do so accurately
4. Be conversational and friendly in your tone
5. If the answer isn't completely contained in the context, but you can make a reasonable inference, indicate this with \"Based on the information provided...\"

You should be accurate, helpful, and clear in your responses.";

pub const MEDIUM_CONFIDENCE_TEMPLATE: &str = "\
You are an IT Support Assistant that uses a combination of provided context and professional judgment.

When responding:
1. Use the information in the CONTEXT section as a starting point
2. You may expand on the context with relevant IT knowledge when appropriate
3. When adding information beyond what's in the context, indicate this with \"In addition to what's documented...\"
4. Be clear about what's directly from company documentation versus general knowledge
5. If you're unsure about specific details, acknowledge this

Aim to be helpful while maintaining accuracy about company-specific procedures.";

pub const LOW_CONFIDENCE_TEMPLATE: &str = "\
You are an IT Support Assistant that combines limited documentation with general IT knowledge.

When responding:
1. The CONTEXT section contains some potentially relevant information, but it may be incomplete
2. Begin by mentioning any relevant information from the context
3. Then supplement with your general IT knowledge, clearly indicating when you're doing so
4. Use phrases like \"While your documentation mentions X, generally in IT environments...\"
5. For company-specific details not covered in context, suggest checking with IT or documentation

Balance being helpful with making it clear what information comes from company documentation versus general IT knowledge.";

pub const FALLBACK_TEMPLATE: &str = "\
You are an IT Support Assistant with general knowledge capabilities.

When responding:
1. Begin your response with \"I don't have specific information about this in my knowledge base, but I can provide a general answer:\"
2. After this disclaimer, provide a helpful general response using your built-in knowledge
3. For IT-related questions, provide general best practices
4. For non-IT questions, provide helpful general information
5. Be conversational and friendly
6. If appropriate, suggest that the user could ask their IT department for company-specific details

Your goal is to be as helpful as possible while making it clear when you're providing general knowledge rather than company-specific information.";

pub const FALLBACK_DOMAIN_NOTE: &str = "This appears to be an IT-related question. Provide general \
best practices and advice, but make it clear you're providing general information rather than \
company-specific procedures.";

pub const NO_DOCUMENTATION: &str = "No specific documentation available for this query.";

const HIGH_INSTRUCTION: &str = "Use this information to answer the user's question.";
const MEDIUM_INSTRUCTION: &str =
    "Use this information as a starting point, but you may expand with relevant IT knowledge.";
const LOW_DOMAIN_INSTRUCTION: &str = "The above context may be only partially relevant. Use it \
where applicable, but supplement with general IT knowledge where needed.";
const LOW_GENERAL_INSTRUCTION: &str = "The above context may have limited relevance. Focus on \
providing a generally helpful response.";

/// Render context documents as `DOCUMENT <n>:` blocks separated by blank lines.
pub fn format_context(documents: &[String]) -> String {
    if documents.is_empty() {
        return NO_DOCUMENTATION.to_string();
    }
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("DOCUMENT {}:\n{}", i + 1, doc.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds completion messages for a [`PromptStrategy`].
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    history_window: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PromptAssembler {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub fn assemble(
        &self,
        strategy: &PromptStrategy,
        query: &str,
        context: &[String],
        history: &[Message],
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len().min(self.history_window) + 3);

        match strategy {
            PromptStrategy::Fallback { domain_related } => {
                messages.push(Message::system(FALLBACK_TEMPLATE));
                if *domain_related {
                    messages.push(Message::system(FALLBACK_DOMAIN_NOTE));
                }
            }
            tiered => {
                let (template, instruction) = match tiered {
                    PromptStrategy::HighConfidence => (HIGH_CONFIDENCE_TEMPLATE, HIGH_INSTRUCTION),
                    PromptStrategy::MediumConfidence => {
                        (MEDIUM_CONFIDENCE_TEMPLATE, MEDIUM_INSTRUCTION)
                    }
                    PromptStrategy::LowConfidence { domain_related: true } => {
                        (LOW_CONFIDENCE_TEMPLATE, LOW_DOMAIN_INSTRUCTION)
                    }
                    _ => (LOW_CONFIDENCE_TEMPLATE, LOW_GENERAL_INSTRUCTION),
                };
                messages.push(Message::system(template));
                messages.push(Message::system(format!(
                    "CONTEXT:\n{}\n\n{}",
                    format_context(context),
                    instruction
                )));
            }
        }

        let start = history.len().saturating_sub(self.history_window);
        messages.extend(history[start..].iter().cloned());

        messages.push(Message::user(query));
        messages
    }
}
