use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use eldercare_voice_runtime::db::InMemoryHistory;
use eldercare_voice_runtime::http::{self, AppState};
use eldercare_voice_runtime::lexicon::lexicon;
use eldercare_voice_runtime::llm::build_providers;
use eldercare_voice_runtime::ports::SessionStore;
use eldercare_voice_runtime::service::anticipation::AnticipationService;
use eldercare_voice_runtime::service::voice::{VoiceChat, VoiceRuntime};
use eldercare_voice_runtime::session::InMemorySessionStore;
use eldercare_voice_runtime::{config, logging};

/// Starts the HTTP server with the in-memory session store and history, and runs until
/// Ctrl-C.
///
/// # Returns
///
/// `Ok(())` on graceful shutdown, or an error if the configuration is invalid or the
/// listener cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cfg = config::Config::from_env()?;
    let store_cfg = config::session_store_config().clone();
    let runtime_cfg = config::runtime_config();
    if runtime_cfg.strict_validation {
        info!("[main] strict validation enabled");
    }

    let store = Arc::new(InMemorySessionStore::new(&store_cfg));
    let history = Arc::new(InMemoryHistory::new(
        runtime_cfg.history_max_per_user,
        runtime_cfg.history_max_users,
    ));
    let providers = build_providers(config::ai_config());
    if providers.is_empty() {
        warn!("[main] no LLM provider configured, chat will answer with the fallback apology");
    }

    let state = AppState {
        runtime: Arc::new(VoiceRuntime::new(
            store.clone(),
            lexicon().clone(),
            runtime_cfg.strict_validation,
        )),
        chat: Arc::new(VoiceChat::new(providers)),
        anticipation: Arc::new(AnticipationService::new(
            history,
            runtime_cfg.strict_validation,
        )),
        strict: runtime_cfg.strict_validation,
    };

    if store_cfg.ttl.is_some() {
        let sweeper = store.clone();
        let period = store_cfg.sweep_interval.max(std::time::Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = sweeper.evict_expired();
                if evicted > 0 {
                    info!(
                        "[session] evicted {} idle sessions, {} remain",
                        evicted,
                        sweeper.len()
                    );
                }
            }
        });
    }

    let listener = TcpListener::bind(cfg.http_bind_addr).await?;
    http::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[main] ctrl_c listener failed: {:?}", e);
            std::future::pending::<()>().await;
        }
        info!("[main] shutdown requested");
    })
    .await?;
    Ok(())
}
