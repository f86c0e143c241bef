//! Query expansion with IT-support synonyms.
//!
//! Embeddings are sensitive to exact wording, so the raw query is widened with
//! synonyms of the domain terms it mentions before it is embedded. Expansion
//! follows synonyms that are themselves mapped terms, so the result is closed
//! under the table: expanding an already-expanded query adds nothing new.
//!
//! This is wider than a single lookup per query term: "vpn" reaches "network"
//! through "virtual private network" and so also picks up "wifi" and "lan".

use std::collections::HashSet;

/// Canonical domain terms and their synonyms.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    // Verbs for account/password operations
    ("reset", &["change", "update", "modify", "alter", "edit", "fix"]),
    ("change", &["reset", "update", "modify", "alter", "edit", "revise"]),
    ("add", &["create", "generate", "make", "setup", "configure", "establish"]),
    ("remove", &["delete", "disable", "revoke", "terminate", "eliminate"]),
    ("install", &["setup", "deploy", "implement", "add", "configure"]),
    // IT objects
    ("password", &["credentials", "login", "authentication", "passcode", "pwd"]),
    ("account", &["user", "profile", "login", "id", "identity"]),
    ("config", &["configuration", "setting", "option", "parameter", "preference"]),
    ("settings", &["options", "preferences", "configurations", "parameters", "setup"]),
    // Vendor terminology
    ("ms", &["microsoft", "office365", "azure", "windows", "o365"]),
    ("microsoft", &["ms", "office365", "windows", "o365", "msft"]),
    ("login", &["sign in", "log in", "access", "authenticate", "credentials"]),
    ("vpn", &["remote access", "remote connection", "virtual private network"]),
    // Common topics
    ("email", &["mail", "outlook", "message", "inbox"]),
    ("printer", &["printing", "print", "scanner", "copier"]),
    ("network", &["internet", "connection", "wifi", "ethernet", "lan"]),
    ("file", &["document", "folder", "directory", "data"]),
    ("permission", &["access", "right", "privilege", "authorization"]),
];

/// Synonyms for a bare, lower-case term.
pub fn synonyms_for(term: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(key, _)| *key == term)
        .map(|(_, synonyms)| *synonyms)
}

/// Drop everything that is not a word character.
fn strip_punctuation(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Widens a query with synonyms from [`SYNONYMS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExpander;

impl QueryExpander {
    pub fn new() -> Self {
        Self
    }

    /// Lower-case the query, keep its tokens as typed, then append the
    /// synonyms of every mapped term, first occurrence wins.
    pub fn expand(&self, query: &str) -> String {
        let lowered = query.to_lowercase();
        let mut terms: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for token in lowered.split_whitespace() {
            if seen.insert(token.to_string()) {
                terms.push(token.to_string());
            }
        }

        let mut pending: Vec<String> = lowered.split_whitespace().map(strip_punctuation).collect();
        let mut expanded: HashSet<String> = HashSet::new();
        let mut cursor = 0;

        while cursor < pending.len() {
            let term = pending[cursor].clone();
            cursor += 1;
            if !expanded.insert(term.clone()) {
                continue;
            }
            let Some(synonyms) = synonyms_for(&term) else {
                continue;
            };
            for synonym in synonyms {
                if seen.insert((*synonym).to_string()) {
                    terms.push((*synonym).to_string());
                }
                pending.extend(synonym.split_whitespace().map(strip_punctuation));
            }
        }

        terms.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> HashSet<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn empty_query() {
        assert_eq!(QueryExpander::new().expand(""), "");
        assert_eq!(QueryExpander::new().expand("   "), "");
    }

    #[test]
    fn unmapped_words_pass_through_lowercased() {
        let expanded = QueryExpander::new().expand("What is the capital of France?");
        assert_eq!(expanded, "what is the capital of france?");
    }

    #[test]
    fn originals_first_then_synonyms() {
        let expanded = QueryExpander::new().expand("Email broken");
        assert_eq!(expanded, "email broken mail outlook message inbox");
    }

    #[test]
    fn punctuation_stripped_for_lookup_only() {
        let expanded = QueryExpander::new().expand("Printer?");
        assert!(expanded.starts_with("printer? "));
        assert!(expanded.contains("scanner"));
    }

    #[test]
    fn duplicates_keep_first_position() {
        let expanded = QueryExpander::new().expand("reset change");
        let words: Vec<&str> = expanded.split(' ').collect();
        assert_eq!(&words[..3], &["reset", "change", "update"]);
        assert_eq!(words.iter().filter(|w| **w == "update").count(), 1);
        assert_eq!(words.iter().filter(|w| **w == "reset").count(), 1);
    }

    #[test]
    fn follows_synonyms_that_are_mapped_terms() {
        // reset -> change -> revise
        let expanded = QueryExpander::new().expand("reset");
        assert!(expanded.contains("revise"));

        // vpn -> "virtual private network" -> network -> wifi
        let expanded = QueryExpander::new().expand("vpn");
        assert!(expanded.contains("wifi"));
    }

    #[test]
    fn second_pass_adds_nothing_new() {
        let expander = QueryExpander::new();
        for query in [
            "How do I reset a password?",
            "How do I change someone's MS login?",
            "vpn keeps dropping",
            "Do you know how to do MS stuff?",
            "install the printer driver and add permission",
        ] {
            let once = expander.expand(query);
            let twice = expander.expand(&once);
            assert_eq!(tokens(&once), tokens(&twice), "query: {query}");
        }
    }

    #[test]
    fn table_lookup() {
        assert!(synonyms_for("vpn").unwrap().contains(&"remote access"));
        assert!(synonyms_for("VPN").is_none());
        assert!(synonyms_for("banana").is_none());
    }
}
