use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub http_bind_addr: SocketAddr,
}

impl Config {
    /// Create a Config populated from environment variables, falling back to defaults when keys are absent.
    ///
    /// Reads:
    /// - HTTP_BIND_ADDR (default "0.0.0.0:8080")
    ///
    /// # Errors
    ///
    /// Returns an error when HTTP_BIND_ADDR is set but is not a socket address.
    ///
    /// # Examples
    ///
    /// ```
    /// use eldercare_voice_runtime::config::Config;
    ///
    /// let cfg = Config::from_env().unwrap();
    /// let _port = cfg.http_bind_addr.port();
    /// ```
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("HTTP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let http_bind_addr = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid HTTP_BIND_ADDR={}", raw))?;
        Ok(Self { http_bind_addr })
    }
}

#[derive(Clone, Debug)]
pub enum LogMode {
    Stdout,
    File,
}

#[derive(Clone, Debug)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub mode: LogMode,
    pub format: LogFormat,
    pub dir: Option<String>,
    pub file_name: String,
}

impl LoggingConfig {
    fn from_env() -> Self {
        let dir_env = std::env::var("LOG_DIR").ok();
        let mode_env = std::env::var("LOG_MODE").ok();
        let format_env = std::env::var("LOG_FORMAT").ok();

        let format = match format_env.as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let mode = match mode_env.as_deref() {
            Some("file") => LogMode::File,
            Some("stdout") => LogMode::Stdout,
            _ => {
                if dir_env.is_some() {
                    LogMode::File
                } else {
                    LogMode::Stdout
                }
            }
        };

        let dir = match mode {
            LogMode::File => Some(dir_env.unwrap_or_else(|| "logs".to_string())),
            LogMode::Stdout => None,
        };

        let file_name = std::env::var("LOG_FILE_NAME").unwrap_or_else(|_| "app.log".to_string());

        Self {
            mode,
            format,
            dir,
            file_name,
        }
    }
}

static LOGGING: OnceLock<LoggingConfig> = OnceLock::new();

pub fn logging_config() -> &'static LoggingConfig {
    LOGGING.get_or_init(LoggingConfig::from_env)
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub max_output_tokens: u32,
}

impl AiConfig {
    /// Reads the LLM provider settings.
    ///
    /// - `GEMINI_API_KEY`: optional; Gemini is skipped when unset.
    /// - `GEMINI_MODEL`: defaults to `"gemini-2.0-flash"`.
    /// - `ANTHROPIC_API_KEY`: optional; Anthropic is skipped when unset.
    /// - `ANTHROPIC_MODEL`: defaults to `"claude-3-haiku-20240307"`.
    /// - `LLM_MAX_OUTPUT_TOKENS`: defaults to 100, voice replies stay short.
    fn from_env() -> Self {
        Self {
            gemini_api_key: env_non_empty("GEMINI_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            anthropic_api_key: env_non_empty("ANTHROPIC_API_KEY"),
            anthropic_model: std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-haiku-20240307".to_string()),
            max_output_tokens: env_u32("LLM_MAX_OUTPUT_TOKENS", 100),
        }
    }
}

static AI_CONFIG: OnceLock<AiConfig> = OnceLock::new();

pub fn ai_config() -> &'static AiConfig {
    AI_CONFIG.get_or_init(AiConfig::from_env)
}

#[derive(Clone, Debug)]
pub struct Timeouts {
    pub ai_http: Duration,
}

impl Timeouts {
    fn from_env() -> Self {
        // Env: AI_HTTP_TIMEOUT_MS. On timeout the provider is treated as failed.
        Self {
            ai_http: env_duration_ms("AI_HTTP_TIMEOUT_MS", 15_000),
        }
    }
}

static TIMEOUTS: OnceLock<Timeouts> = OnceLock::new();

pub fn timeouts() -> &'static Timeouts {
    TIMEOUTS.get_or_init(Timeouts::from_env)
}

#[derive(Clone, Debug)]
pub struct SessionStoreConfig {
    /// `None` disables idle eviction.
    pub ttl: Option<Duration>,
    pub max_entries: usize,
    pub sweep_interval: Duration,
}

impl SessionStoreConfig {
    fn from_env() -> Self {
        let ttl_sec = env_u64("SESSION_TTL_SEC", 3600);
        let ttl = if ttl_sec == 0 {
            None
        } else {
            Some(Duration::from_secs(ttl_sec))
        };
        let mut max_entries = env_u64("SESSION_MAX_ENTRIES", 10_000) as usize;
        if max_entries == 0 {
            log::warn!("[config] SESSION_MAX_ENTRIES=0 is not usable, fallback to 1");
            max_entries = 1;
        }
        Self {
            ttl,
            max_entries,
            sweep_interval: env_duration_sec("SESSION_SWEEP_INTERVAL_SEC", 60),
        }
    }
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(3600)),
            max_entries: 10_000,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

static SESSION_STORE_CONFIG: OnceLock<SessionStoreConfig> = OnceLock::new();

pub fn session_store_config() -> &'static SessionStoreConfig {
    SESSION_STORE_CONFIG.get_or_init(SessionStoreConfig::from_env)
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Reject missing or non-finite numeric inputs instead of substituting defaults.
    pub strict_validation: bool,
    pub history_max_per_user: usize,
    pub history_max_users: usize,
    pub name_tokens: Vec<String>,
}

impl RuntimeConfig {
    fn from_env() -> Self {
        let name_tokens = env_non_empty("ASSISTANT_NAME_TOKENS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_else(|| vec!["radim".to_string(), "radime".to_string()]);
        Self {
            strict_validation: env_bool("STRICT_VALIDATION", false),
            history_max_per_user: env_u64("ANTICIPATION_HISTORY_MAX", 500) as usize,
            history_max_users: env_u64("ANTICIPATION_HISTORY_MAX_USERS", 1000) as usize,
            name_tokens,
        }
    }
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::from_env)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(key, default_ms))
}

fn env_duration_sec(key: &str, default_sec: u64) -> Duration {
    Duration::from_secs(env_u64(key, default_sec))
}

fn env_bool(key: &str, default_value: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(default_value)
}

fn env_u32(key: &str, default_value: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default_value)
}

fn env_u64(key: &str, default_value: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_value)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_lowercases() {
        assert_eq!(
            parse_list(" Radim, RADIME ,, anna"),
            vec!["radim".to_string(), "radime".to_string(), "anna".to_string()]
        );
    }

    #[test]
    fn env_helpers_fall_back_on_garbage() {
        std::env::set_var("VOICE_RUNTIME_TEST_U64", "not-a-number");
        assert_eq!(env_u64("VOICE_RUNTIME_TEST_U64", 7), 7);
        std::env::set_var("VOICE_RUNTIME_TEST_BOOL", "Yes");
        assert!(env_bool("VOICE_RUNTIME_TEST_BOOL", false));
        assert!(!env_bool("VOICE_RUNTIME_TEST_BOOL_MISSING", false));
        std::env::set_var("VOICE_RUNTIME_TEST_EMPTY", "   ");
        assert_eq!(env_non_empty("VOICE_RUNTIME_TEST_EMPTY"), None);
    }
}
