//! Web gateway: the HTTP surface of the admission assistant.
//!
//! Serves the knowledge-base routes, media token minting and the voice
//! session API over axum. The router is exposed separately from `start` so
//! tests can drive it against an ephemeral listener.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

use crate::config::Settings;
use crate::conversation::ConversationManager;
use crate::error::{HelplineError, HelplineResult};
use crate::knowledge::KnowledgeBase;
use crate::media::{validate_token, AccessToken, VideoGrants};
use crate::models::{ApiResponse, TokenResponse, VoiceSessionResponse};

pub const DEFAULT_ROOM: &str = "parul-admission";

struct AppState {
    settings: Settings,
    kb: Arc<KnowledgeBase>,
    manager: Arc<ConversationManager>,
}

/// The admission gateway service.
pub struct Gateway {
    state: Arc<AppState>,
}

impl Gateway {
    pub fn new(
        settings: Settings,
        kb: Arc<KnowledgeBase>,
        manager: Arc<ConversationManager>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                settings,
                kb,
                manager,
            }),
        }
    }

    /// Build the full route table.
    pub fn router(&self) -> Router {
        let cors = cors_layer(&self.state.settings.allowed_origins);

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/api/courses", get(courses_handler))
            .route("/api/courses/:course_id", get(course_handler))
            .route("/api/fees/:course_id", get(fees_handler))
            .route("/api/scholarship/calculate", get(scholarship_handler))
            .route("/api/auth/token/generate", post(generate_token_handler))
            .route("/api/auth/token/validate", get(validate_token_handler))
            .route("/api/voice/session/create", post(create_session_handler))
            .route("/api/voice/session/:session_id", get(get_session_handler))
            .route(
                "/api/voice/session/:session_id/message",
                post(send_message_handler),
            )
            .route("/api/voice/session/:session_id/end", post(end_session_handler))
            .route(
                "/api/voice/session/:session_id/history",
                get(history_handler),
            )
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> HelplineResult<()> {
        let settings = &self.state.settings;
        info!(
            "Starting {} v{}",
            settings.app_name, settings.app_version
        );
        info!("Loaded {} courses", self.state.kb.courses().len());

        let addr = settings.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| HelplineError::Generic(format!("failed to bind {}: {}", addr, e)))?;
        info!("Gateway listening on http://{}", addr);

        let router = self.router();
        axum::serve(listener, router)
            .await
            .map_err(|e| HelplineError::Generic(format!("server error: {}", e)))
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "name": state.settings.app_name,
        "version": state.settings.app_version,
        "status": "running",
        "endpoints": {
            "auth": "/api/auth",
            "voice": "/api/voice",
            "courses": "/api/courses"
        }
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": state.settings.app_version
    }))
}

async fn courses_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let courses = state.kb.courses();
    Json(json!({
        "courses": courses,
        "count": courses.len()
    }))
}

async fn course_handler(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    match state.kb.get_course_by_id(&course_id) {
        Some(course) => Ok(Json(serde_json::to_value(course).unwrap_or_default())),
        None => Err(not_found("Course not found")),
    }
}

async fn fees_handler(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    match state.kb.get_fees_by_course_id(&course_id) {
        Some(fees) => Ok(Json(serde_json::to_value(fees).unwrap_or_default())),
        None => Err(not_found("Fee structure not found")),
    }
}

#[derive(Debug, Deserialize)]
struct ScholarshipQuery {
    course_id: String,
    percentage: f64,
}

async fn scholarship_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScholarshipQuery>,
) -> Json<serde_json::Value> {
    let result = state
        .kb
        .calculate_scholarship(query.percentage, &query.course_id);
    Json(serde_json::to_value(result).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct GenerateTokenRequest {
    room_name: Option<String>,
    participant_name: Option<String>,
}

async fn generate_token_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<GenerateTokenRequest>>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ApiResponse>)> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let room_name = request.room_name.unwrap_or_else(|| DEFAULT_ROOM.to_string());
    let participant_name = request
        .participant_name
        .unwrap_or_else(|| "student".to_string());

    let token = AccessToken::new(
        &state.settings.livekit_api_key,
        &state.settings.livekit_api_secret,
    )
    .with_identity(&participant_name)
    .with_name(&participant_name)
    .with_grants(VideoGrants::for_room(&room_name));

    let expires_at = token.expires_at();
    match token.to_jwt() {
        Ok(jwt) => {
            info!(
                "Generated token for {} in room {}",
                participant_name, room_name
            );
            Ok(Json(TokenResponse {
                token: jwt,
                url: state.settings.livekit_url.clone(),
                room_name,
                participant_name,
                expires_at,
            }))
        }
        Err(e) => {
            error!("Error generating token: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Failed to generate token", e.to_string())),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidateTokenQuery {
    token: String,
}

async fn validate_token_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateTokenQuery>,
) -> Json<serde_json::Value> {
    match validate_token(&query.token, &state.settings.livekit_api_secret) {
        Ok(_) => Json(json!({ "valid": true, "message": "Token is valid" })),
        Err(e) => Json(json!({ "valid": false, "message": e.to_string() })),
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateSessionQuery {
    user_id: Option<String>,
}

async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateSessionQuery>,
) -> Json<VoiceSessionResponse> {
    let session_id = state.manager.create_session(query.user_id.as_deref());
    info!("Created voice session: {}", session_id);

    Json(VoiceSessionResponse {
        session_id,
        status: "active".to_string(),
        room_name: DEFAULT_ROOM.to_string(),
        created_at: Utc::now(),
    })
}

async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    let Some(session_state) = state.manager.get_session_state(&session_id) else {
        return Err(not_found("Session not found"));
    };
    let history = state.manager.get_conversation_history(&session_id, None);
    let message_count = history.len();

    Ok(Json(json!({
        "session_id": session_id,
        "state": session_state,
        "history": history,
        "message_count": message_count
    })))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    message: String,
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state
        .manager
        .process_message(&session_id, &payload.message)
        .await
    {
        Ok(response) => Ok(Json(ApiResponse::ok(
            "Message processed",
            Some(json!({
                "response": response,
                "session_id": session_id
            })),
        ))),
        Err(e) => {
            error!("Error processing message: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Failed to process message", e.to_string())),
            ))
        }
    }
}

async fn end_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse> {
    state.manager.end_session(&session_id);
    Json(ApiResponse::ok(
        format!("Session {} ended successfully", session_id),
        None,
    ))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<serde_json::Value> {
    let history = state
        .manager
        .get_conversation_history(&session_id, query.limit);
    let count = history.len();
    Json(json!({
        "session_id": session_id,
        "history": history,
        "count": count
    }))
}

fn not_found(message: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::err(message, "not found")),
    )
}
