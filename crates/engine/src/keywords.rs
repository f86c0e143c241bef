//! Static keyword tables: domain detection and the canned small-talk replies
//! that bypass retrieval.

/// Terms that mark a query as IT-support related.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "password",
    "reset",
    "account",
    "login",
    "email",
    "server",
    "network",
    "computer",
    "laptop",
    "desktop",
    "vpn",
    "wifi",
    "software",
    "hardware",
    "install",
    "update",
    "domain",
    "active directory",
    "admin",
    "administrator",
    "config",
    "configuration",
    "setup",
    "system",
    "drive",
    "database",
    "access",
    "permission",
    "user",
    "printer",
    "device",
    "authentication",
    "security",
    "microsoft",
    "ms",
    "windows",
    "office",
    "azure",
    "sharepoint",
    "onedrive",
    "app",
    "application",
    "program",
    "browser",
    "website",
    "portal",
    "cloud",
    "file",
    "folder",
    "document",
    "data",
    "backup",
    "restore",
    "recover",
];

/// Case-insensitive substring test against [`DOMAIN_KEYWORDS`].
///
/// Substring matching is deliberately loose: "apps" and "dataset" both count.
pub fn is_domain_related(query: &str) -> bool {
    let query = query.to_lowercase();
    DOMAIN_KEYWORDS.iter().any(|keyword| query.contains(keyword))
}

const WEATHER_WORDS: &[&str] = &["weather", "temperature", "forecast", "rain", "snow"];

const GREETING_PHRASES: &[&str] = &["how are you", "how're you", "how you doing"];

pub const WEATHER_REPLY: &str = "I don't have specific information about this in my knowledge base, \
but I can provide a general answer: I don't have access to current weather data. You would need to \
check a weather service or app for current conditions.";

pub const GREETING_REPLY: &str =
    "I'm doing well, thank you for asking! How can I help you today?";

/// A fixed answer for out-of-domain small talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedReply {
    Weather,
    Greeting,
}

impl CannedReply {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Weather => WEATHER_REPLY,
            Self::Greeting => GREETING_REPLY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Greeting => "greeting",
        }
    }
}

/// Check the small-talk patterns. A word that starts with a weather term
/// counts ("raining", "forecasts"), a weather term buried inside a word
/// ("train", "brainstorm") does not. Greetings match anywhere.
pub fn canned_reply(query: &str) -> Option<CannedReply> {
    let query = query.to_lowercase();

    let mentions_weather = query
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| WEATHER_WORDS.iter().any(|w| word.starts_with(w)));
    if mentions_weather {
        return Some(CannedReply::Weather);
    }

    if GREETING_PHRASES.iter().any(|phrase| query.contains(phrase)) {
        return Some(CannedReply::Greeting);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_detection() {
        assert!(is_domain_related("How do I reset a password?"));
        assert!(is_domain_related("Problem with ACTIVE DIRECTORY sync"));
        assert!(!is_domain_related("What is the capital of France?"));
    }

    #[test]
    fn domain_detection_is_substring_based() {
        // "ms" inside "items"
        assert!(is_domain_related("list the items"));
    }

    #[test]
    fn weather_short_circuit() {
        assert_eq!(canned_reply("What's the weather?"), Some(CannedReply::Weather));
        assert_eq!(canned_reply("Will it SNOW tomorrow"), Some(CannedReply::Weather));
        assert_eq!(canned_reply("server room temperature"), Some(CannedReply::Weather));
    }

    #[test]
    fn weather_inflections_short_circuit() {
        assert_eq!(canned_reply("Is it raining?"), Some(CannedReply::Weather));
        assert_eq!(canned_reply("Is it snowing outside?"), Some(CannedReply::Weather));
        assert_eq!(
            canned_reply("What are the temperatures today?"),
            Some(CannedReply::Weather)
        );
        assert_eq!(canned_reply("forecasts for tomorrow"), Some(CannedReply::Weather));
    }

    #[test]
    fn weather_term_inside_word_ignored() {
        assert_eq!(canned_reply("train new staff on the portal"), None);
        assert_eq!(canned_reply("brainstorm a backup plan"), None);
    }

    #[test]
    fn greeting_short_circuit() {
        assert_eq!(canned_reply("Hi, how are you?"), Some(CannedReply::Greeting));
        assert_eq!(canned_reply("how you doing today"), Some(CannedReply::Greeting));
        assert_eq!(canned_reply("How're you"), Some(CannedReply::Greeting));
    }

    #[test]
    fn weather_reply_carries_disclaimer() {
        assert!(
            CannedReply::Weather
                .text()
                .starts_with("I don't have specific information about this in my knowledge base")
        );
    }

    #[test]
    fn ordinary_query_not_canned() {
        assert_eq!(canned_reply("How do I map a network drive?"), None);
    }
}
