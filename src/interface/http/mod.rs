//! http: JSON endpoints for the voice runtime and the anticipation engine.
//! - A body that is not a JSON object is a 400.
//! - Inside an object, missing or mistyped fields take their defaults field by field.
//! - An empty body reads as `{}` unless strict validation is on.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::service::anticipation::{
    AnticipationService, PredictionRequest, SpeechAdjustRequest,
};
use crate::service::voice::{
    chat_turn, ChatRequest, MetricsRequest, TransitionRequest, VoiceChat, VoiceRuntime,
};
use crate::shared::error::runtime::ValidationError;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<VoiceRuntime>,
    pub chat: Arc<VoiceChat>,
    pub anticipation: Arc<AnticipationService>,
    pub strict: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/voice/health", get(voice_health))
        .route("/api/voice/metrics", post(voice_metrics))
        .route("/api/voice/state", post(voice_state))
        .route("/api/voice/session/:session_id", get(voice_session))
        .route("/api/voice/prompt", get(voice_prompt))
        .route("/api/voice/chat", post(voice_chat))
        .route("/api/anticipation/health", get(anticipation_health))
        .route("/api/anticipation/predict", post(anticipation_predict))
        .route("/api/anticipation/speech-adjust", post(anticipation_speech_adjust))
        .route("/api/anticipation/history", get(anticipation_history))
        .with_state(state)
}

/// Serves on an already bound listener until the task is aborted.
pub async fn spawn_server_with_listener(
    listener: TcpListener,
    state: AppState,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(state)).await {
            log::error!("[http] server error: {:?}", e);
        }
    })
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("[http] listening on {}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

pub enum ApiError {
    BadRequest(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self::BadRequest(error) = self;
        warn!("[http] rejected request: {}", error);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

/// Anticipation responses carry `"success": true` next to the payload.
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

fn ok<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

fn parse_body<T: DeserializeOwned>(raw: &[u8], strict: bool) -> Result<T, ApiError> {
    let value = if raw.iter().all(u8::is_ascii_whitespace) {
        if strict {
            return Err(ApiError::BadRequest("request body is required".to_string()));
        }
        Value::Object(Default::default())
    } else {
        serde_json::from_slice::<Value>(raw)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?
    };
    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn voice_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.runtime.health())
}

async fn voice_metrics(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: MetricsRequest = parse_body(&body, state.strict)?;
    let report = state.runtime.compute_metrics(&req).await?;
    Ok(Json(report))
}

async fn voice_state(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: TransitionRequest = parse_body(&body, state.strict)?;
    Ok(Json(state.runtime.apply_event(&req).await))
}

async fn voice_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    Json(state.runtime.session_info(&session_id).await)
}

async fn voice_prompt(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.runtime.voice_prompt())
}

async fn voice_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: ChatRequest = parse_body(&body, state.strict)?;
    let reply = chat_turn(&state.runtime, &state.chat, &req).await?;
    Ok(Json(reply))
}

async fn anticipation_health(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.anticipation.health())
}

async fn anticipation_predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: PredictionRequest = parse_body(&body, state.strict)?;
    Ok(ok(state.anticipation.predict(&req)?))
}

async fn anticipation_speech_adjust(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: SpeechAdjustRequest = parse_body(&body, state.strict)?;
    Ok(ok(state.anticipation.speech_adjust(&req)?))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    user_id: Option<String>,
    limit: Option<String>,
}

async fn anticipation_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.as_deref().and_then(|v| v.trim().parse().ok());
    ok(state.anticipation.history(query.user_id.as_deref(), limit))
}
