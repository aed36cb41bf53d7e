//! HTTP route handlers of the stub backend.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::types::{
    AskRequest, AskResponse, ErrorBody, ProcessResponse, SessionDocument, UrlRequest,
};
use crate::api::{Session, SessionId};

use super::state::{StubError, StubState};

/// Error response carrying `{detail}`.
type ApiFailure = (StatusCode, Json<ErrorBody>);

impl From<StubError> for ApiFailure {
    fn from(err: StubError) -> Self {
        let (status, detail) = match err {
            StubError::InvalidUrl(reason) => {
                (StatusCode::BAD_REQUEST, format!("Invalid URL: {reason}"))
            }
            StubError::SessionNotFound => (StatusCode::NOT_FOUND, "Session not found.".to_string()),
            StubError::NothingLoaded => (
                StatusCode::BAD_REQUEST,
                "No URL has been loaded yet.".to_string(),
            ),
        };
        (status, Json(ErrorBody::new(detail)))
    }
}

/// Create the API router with all routes.
pub fn create_router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", get(list_sessions))
        .route("/session/{session_id}", get(session_detail))
        .route("/process-url", post(process_url))
        .route("/load-url", post(load_url))
        .route("/ask", post(ask))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "urlchat-stub",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_sessions(State(state): State<Arc<StubState>>) -> Json<Vec<Session>> {
    Json(state.list_sessions().await)
}

async fn session_detail(
    State(state): State<Arc<StubState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDocument>, ApiFailure> {
    let document = state
        .session_document(&SessionId::new(session_id))
        .await?;
    Ok(Json(document))
}

async fn process_url(
    State(state): State<Arc<StubState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<ProcessResponse>, ApiFailure> {
    let session = state.create_session(&request.url).await?;
    Ok(Json(ProcessResponse {
        message: Some("Site crawled successfully.".to_string()),
        session_id: session.id,
        title: session.title,
    }))
}

async fn load_url(
    State(state): State<Arc<StubState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    state.load_legacy(&request.url).await?;
    Ok(Json(serde_json::json!({ "message": "Loading started." })))
}

/// Both flavours of `/ask`: with a session identifier, or legacy without.
async fn ask(
    State(state): State<Arc<StubState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiFailure> {
    let answer = match &request.session_id {
        Some(session_id) => state.ask(session_id, &request.question).await?,
        None => state.ask_legacy(&request.question).await?,
    };
    Ok(Json(AskResponse { answer }))
}
