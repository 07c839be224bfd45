use std::sync::Arc;

use chrono::Local;
use log::{info, warn};
use serde::Serialize;

use crate::service::voice::prompt::voice_system_prompt;
use crate::shared::ports::ai::{ChatMessage, LlmPort};

/// Number of trailing conversation turns sent to the model.
pub const HISTORY_WINDOW: usize = 6;
pub const FALLBACK_REPLY: &str = "Omlouvám se, zkuste to prosím znovu.";
pub const FALLBACK_PROVIDER: &str = "fallback";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub provider: &'static str,
    pub success: bool,
}

/// Tries each configured model in priority order; the first usable reply wins.
pub struct VoiceChat {
    providers: Vec<Arc<dyn LlmPort>>,
}

impl VoiceChat {
    pub fn new(providers: Vec<Arc<dyn LlmPort>>) -> Self {
        Self { providers }
    }

    pub async fn respond(&self, messages: &[ChatMessage]) -> ChatReply {
        let window = &messages[messages.len().saturating_sub(HISTORY_WINDOW)..];
        let system_prompt = voice_system_prompt(Local::now().date_naive());

        for provider in &self.providers {
            let name = provider.provider();
            match provider
                .generate_answer(system_prompt.clone(), window.to_vec())
                .await
            {
                Ok(raw) => {
                    let text = clean_for_tts(&raw);
                    if text.is_empty() {
                        warn!("[chat] provider={} reply empty after cleanup", name);
                        continue;
                    }
                    info!("[chat] provider={} reply_len={}", name, text.chars().count());
                    return ChatReply {
                        response: text,
                        provider: name,
                        success: true,
                    };
                }
                Err(err) => warn!("[chat] provider={} failed: {}", name, err),
            }
        }

        ChatReply {
            response: FALLBACK_REPLY.to_string(),
            provider: FALLBACK_PROVIDER,
            success: false,
        }
    }
}

const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x24C2, 0x1F251),
    (0x1F300, 0x1F5FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F900, 0x1F9FF),
];

fn is_emoji(ch: char) -> bool {
    let code = ch as u32;
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&code))
}

/// Makes model output speakable: drops emoji and pictographs, unwraps markdown
/// emphasis and code spans, removes heading and list markers, and collapses
/// whitespace to single spaces.
pub fn clean_for_tts(text: &str) -> String {
    let mut out: String = text.chars().filter(|c| !is_emoji(*c)).collect();
    for delim in ["**", "*", "__", "_", "~~", "`"] {
        out = unwrap_delimited(&out, delim);
    }
    out.lines()
        .map(strip_line_markers)
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replaces `<d>content<d>` with `content` when the content is non-empty and does not
/// contain the delimiter's character.
fn unwrap_delimited(text: &str, delim: &str) -> String {
    let marker = match delim.chars().next() {
        Some(c) => c,
        None => return text.to_string(),
    };
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix(delim) {
            let end = inner.find(marker).unwrap_or(inner.len());
            if end > 0 && inner[end..].starts_with(delim) {
                out.push_str(&inner[..end]);
                rest = &inner[end + delim.len()..];
                continue;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    out
}

fn strip_line_markers(line: &str) -> &str {
    let mut line = line;

    let hashes = line.chars().take_while(|&c| c == '#').count().min(6);
    if hashes > 0 {
        line = line[hashes..].trim_start();
    }

    if let Some(rest) = line.strip_prefix(['*', '-']) {
        if rest.starts_with(char::is_whitespace) {
            line = rest.trim_start();
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix('.') {
            if rest.starts_with(char::is_whitespace) {
                line = rest.trim_start();
            }
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ports::ai::{AiFuture, LlmError, Role};
    use std::sync::Mutex;

    struct FakeLlm {
        name: &'static str,
        reply: Result<&'static str, ()>,
        seen: Mutex<Vec<usize>>,
    }

    impl FakeLlm {
        fn new(name: &'static str, reply: Result<&'static str, ()>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl LlmPort for FakeLlm {
        fn provider(&self) -> &'static str {
            self.name
        }

        fn generate_answer(
            &self,
            system_prompt: String,
            messages: Vec<ChatMessage>,
        ) -> AiFuture<Result<String, LlmError>> {
            assert!(system_prompt.contains("Dnešní datum"));
            self.seen.lock().unwrap().push(messages.len());
            let reply = self.reply;
            Box::pin(async move {
                reply
                    .map(str::to_string)
                    .map_err(|_| LlmError::GenerationFailed("boom".to_string()))
            })
        }
    }

    fn history(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| ChatMessage {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("turn {}", i),
            })
            .collect()
    }

    #[tokio::test]
    async fn first_success_wins_and_only_recent_turns_are_sent() {
        let gemini = FakeLlm::new("gemini", Ok("**Dobrý den!** Jak se máte? 😊"));
        let claude = FakeLlm::new("claude", Ok("nepoužito"));
        let providers: Vec<Arc<dyn LlmPort>> = vec![gemini.clone(), claude.clone()];
        let chat = VoiceChat::new(providers);
        let reply = chat.respond(&history(9)).await;
        assert_eq!(reply.response, "Dobrý den! Jak se máte?");
        assert_eq!(reply.provider, "gemini");
        assert!(reply.success);
        assert_eq!(*gemini.seen.lock().unwrap(), vec![6]);
        assert!(claude.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn falls_through_to_next_provider() {
        let providers: Vec<Arc<dyn LlmPort>> = vec![
            FakeLlm::new("gemini", Err(())),
            FakeLlm::new("claude", Ok("Rozumím.")),
        ];
        let chat = VoiceChat::new(providers);
        let reply = chat.respond(&history(1)).await;
        assert_eq!(reply.provider, "claude");
        assert_eq!(reply.response, "Rozumím.");
    }

    #[tokio::test]
    async fn all_failures_give_apology() {
        let providers: Vec<Arc<dyn LlmPort>> = vec![
            FakeLlm::new("gemini", Err(())),
            FakeLlm::new("claude", Ok("🙂")),
        ];
        let chat = VoiceChat::new(providers);
        let reply = chat.respond(&history(2)).await;
        assert_eq!(reply.response, FALLBACK_REPLY);
        assert_eq!(reply.provider, "fallback");
        assert!(!reply.success);

        let none = VoiceChat::new(Vec::new()).respond(&history(2)).await;
        assert_eq!(none.provider, "fallback");
    }

    #[test]
    fn markdown_is_unwrapped() {
        assert_eq!(clean_for_tts("To je *velmi* __důležité__"), "To je velmi důležité");
        assert_eq!(clean_for_tts("použij `kód` a ~~ne~~"), "použij kód a ne");
        assert_eq!(clean_for_tts("2 * 3 = 6"), "2 * 3 = 6");
    }

    #[test]
    fn headings_and_lists_are_flattened() {
        let text = "## Plán\n- první\n2. druhý\n  třetí   řádek";
        assert_eq!(clean_for_tts(text), "Plán první druhý třetí řádek");
        assert_eq!(clean_for_tts("-5 stupňů"), "-5 stupňů");
        assert_eq!(clean_for_tts("3.5 litru"), "3.5 litru");
    }

    #[test]
    fn emoji_and_symbols_are_dropped() {
        assert_eq!(clean_for_tts("Hezký den ☀️🌷 přeji"), "Hezký den přeji");
        assert_eq!(clean_for_tts("Příliš žluťoučký kůň"), "Příliš žluťoučký kůň");
    }
}
