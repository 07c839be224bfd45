use std::sync::OnceLock;

use crate::shared::config;

/// Tokens that address the assistant directly.
pub const DEFAULT_NAME_TOKENS: &[&str] = &["radim", "radime"];

/// Topics the assistant is expected to handle.
pub const DEFAULT_RELEVANCE_KEYWORDS: &[&str] = &[
    "ahoj",
    "pomoc",
    "help",
    "počasí",
    "weather",
    "čas",
    "time",
    "datum",
    "date",
    "připomeň",
    "remind",
    "nastav",
    "set",
    "zavolej",
    "call",
    "zpráva",
    "message",
    "světlo",
    "light",
    "teplota",
    "temperature",
    "televize",
    "tv",
    "rádio",
    "radio",
    "léky",
    "medicine",
    "doktor",
    "doctor",
    "jídlo",
    "food",
    "pití",
    "drink",
    "cvičení",
    "exercise",
    "procházka",
    "walk",
    "rodina",
    "family",
    "vnuk",
    "vnučka",
    "sos",
    "emergency",
    "nouzové",
    "bolest",
    "pain",
];

/// Phrases typical for television or advertising audio in the room.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "reklama",
    "advertisement",
    "sponzor",
    "předpověď počasí na obrazovce",
    "zprávy dne",
    "news of the day",
];

pub const DEFAULT_HELP_KEYWORDS: &[&str] = &["pomoc", "help"];
pub const DEFAULT_CALM_KEYWORDS: &[&str] = &["uklidni", "relax"];

/// Word lists driving the relevance gate and the regulation boost.
///
/// All entries are stored lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexicon {
    pub name_tokens: Vec<String>,
    pub keywords: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub help_keywords: Vec<String>,
    pub calm_keywords: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            name_tokens: owned(DEFAULT_NAME_TOKENS),
            keywords: owned(DEFAULT_RELEVANCE_KEYWORDS),
            ignore_patterns: owned(DEFAULT_IGNORE_PATTERNS),
            help_keywords: owned(DEFAULT_HELP_KEYWORDS),
            calm_keywords: owned(DEFAULT_CALM_KEYWORDS),
        }
    }
}

impl Lexicon {
    pub fn with_name_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !tokens.is_empty() {
            self.name_tokens = tokens;
        }
        self
    }

    pub fn is_name_token(&self, token: &str) -> bool {
        self.name_tokens.iter().any(|name| name == token)
    }

    /// True when the lower-cased text contains any "help" keyword.
    pub fn asks_for_help(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.help_keywords)
    }

    /// True when the lower-cased text contains any "calm down" keyword.
    pub fn asks_for_calm(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.calm_keywords)
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn contains_any(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| text.contains(w.as_str()))
}

static LEXICON: OnceLock<Lexicon> = OnceLock::new();

/// Process-wide lexicon: the defaults with name tokens taken from `ASSISTANT_NAME_TOKENS`.
pub fn lexicon() -> &'static Lexicon {
    LEXICON.get_or_init(|| {
        Lexicon::default().with_name_tokens(config::runtime_config().name_tokens.iter())
    })
}
