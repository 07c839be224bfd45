//! Relevance gate: is an utterance addressed to the assistant, and is it just the
//! microphone picking up the assistant's own last reply?

use std::collections::HashSet;

use serde::Serialize;

use crate::service::control_law::clamp;
use crate::shared::constants::{ECHO_THRESHOLD, RELEVANCE_THRESHOLD};
use crate::shared::lexicon::Lexicon;

const NAME_SCORE: f64 = 0.5;
const KEYWORD_SCORE: f64 = 0.15;
const KEYWORD_SCORE_CAP: f64 = 0.4;
const IGNORE_PENALTY: f64 = 0.3;
const SHORT_COMMAND_BONUS: f64 = 0.1;
const LONG_TEXT_PENALTY: f64 = 0.2;
const SHORT_COMMAND_WORDS: std::ops::RangeInclusive<usize> = 2..=10;
const LONG_TEXT_WORDS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelevanceVerdict {
    pub relevance: f64,
    pub echo_similarity: f64,
    pub is_echo: bool,
    pub should_respond: bool,
}

/// Scores `text` in [0, 1].
///
/// Name tokens and keywords are compared per whitespace token with surrounding
/// punctuation trimmed; ignore patterns may span words and are matched as substrings.
pub fn relevance_score(text: &str, lexicon: &Lexicon) -> f64 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = text.split_whitespace().collect();
    let tokens: HashSet<&str> = lower
        .split_whitespace()
        .map(trim_punctuation)
        .filter(|t| !t.is_empty())
        .collect();

    let mut score = 0.0;
    if tokens.iter().any(|t| lexicon.is_name_token(t)) {
        score += NAME_SCORE;
    }

    let keyword_hits = lexicon
        .keywords
        .iter()
        .filter(|kw| tokens.contains(kw.as_str()))
        .count();
    score += (keyword_hits as f64 * KEYWORD_SCORE).min(KEYWORD_SCORE_CAP);

    for pattern in &lexicon.ignore_patterns {
        if lower.contains(pattern.as_str()) {
            score -= IGNORE_PENALTY;
        }
    }

    if SHORT_COMMAND_WORDS.contains(&words.len()) {
        score += SHORT_COMMAND_BONUS;
    }
    if words.len() > LONG_TEXT_WORDS {
        score -= LONG_TEXT_PENALTY;
    }

    clamp(score, 0.0, 1.0)
}

fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Jaccard index of the lower-cased whitespace word sets. `0.0` when nothing was spoken yet.
pub fn echo_similarity(text: &str, last_tts: &str) -> f64 {
    if last_tts.is_empty() {
        return 0.0;
    }
    let text_lower = text.to_lowercase();
    let tts_lower = last_tts.to_lowercase();
    let text_words: HashSet<&str> = text_lower.split_whitespace().collect();
    let tts_words: HashSet<&str> = tts_lower.split_whitespace().collect();
    if tts_words.is_empty() {
        return 0.0;
    }
    let union = text_words.union(&tts_words).count();
    if union == 0 {
        return 0.0;
    }
    text_words.intersection(&tts_words).count() as f64 / union as f64
}

pub fn classify(text: &str, last_tts: &str, lexicon: &Lexicon) -> RelevanceVerdict {
    let relevance = relevance_score(text, lexicon);
    let echo_similarity = echo_similarity(text, last_tts);
    let is_echo = echo_similarity > ECHO_THRESHOLD;
    RelevanceVerdict {
        relevance,
        echo_similarity,
        is_echo,
        should_respond: relevance >= RELEVANCE_THRESHOLD && !is_echo,
    }
}
