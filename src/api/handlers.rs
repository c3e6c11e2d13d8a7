//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{ErrorResponse, LoginRequest, SelectDomainResponse, TextRequest};
use super::AppState;
use crate::app::{AccessError, AppError, AppView};
use crate::domain::Domain;
use crate::identity::AuthError;
use crate::runtime::{SessionError, SessionHandle, SessionSnapshot};
use crate::state_machine::TransitionError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the page
        .route("/", get(serve_page))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Access and navigation
        .route("/api/app", get(get_app))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/domains/:domain/select", post(select_domain))
        .route("/api/home", post(go_home))
        // Active session
        .route("/api/session", get(get_session))
        .route("/api/session/stream", get(stream_session))
        .route("/api/session/chat", post(send_chat))
        .route("/api/session/draft", post(update_draft))
        .route("/api/session/cancel", post(cancel_request))
        .route("/api/session/retry", post(retry_request))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page Handler
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Access and Navigation
// ============================================================

async fn get_app(State(state): State<AppState>) -> Json<AppView> {
    Json(state.controller.lock().await.view())
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AppView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.login(&req.credential).await?;
    Ok(Json(controller.view()))
}

async fn logout(State(state): State<AppState>) -> Json<AppView> {
    let mut controller = state.controller.lock().await;
    controller.logout().await;
    Json(controller.view())
}

async fn select_domain(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SelectDomainResponse>, ApiError> {
    let domain = Domain::from_wire(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown domain: {name}")))?;

    let mut controller = state.controller.lock().await;
    let session = controller.select_domain(domain)?;
    Ok(Json(SelectDomainResponse {
        app: controller.view(),
        session: session.snapshot(),
    }))
}

async fn go_home(State(state): State<AppState>) -> Result<Json<AppView>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller.go_home()?;
    Ok(Json(controller.view()))
}

// ============================================================
// Active Session
// ============================================================

/// Clone the session handle so the controller lock is not held across session calls
async fn active_session(state: &AppState) -> Result<SessionHandle, ApiError> {
    Ok(state.controller.lock().await.active_session()?)
}

async fn get_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = active_session(&state).await?;
    Ok(Json(session.snapshot()))
}

async fn stream_session(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = active_session(&state).await?;
    // Subscribe before reading the snapshot so no update falls in between
    let broadcast_rx = session.subscribe();
    Ok(sse_stream(session.snapshot(), broadcast_rx))
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = active_session(&state).await?;
    Ok(Json(session.submit(req.text).await?))
}

async fn update_draft(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = active_session(&state).await?;
    Ok(Json(session.update_draft(req.text).await?))
}

async fn cancel_request(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = active_session(&state).await?;
    Ok(Json(session.cancel().await?))
}

async fn retry_request(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = active_session(&state).await?;
    Ok(Json(session.retry().await?))
}

async fn get_version() -> &'static str {
    concat!("advisory-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Rejected(TransitionError::EmptyMessage) => {
                ApiError::BadRequest(e.to_string())
            }
            SessionError::Rejected(_) => ApiError::Conflict(e.to_string()),
            SessionError::Closed => ApiError::NotFound(e.to_string()),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Auth(AuthError::Storage(_)) => ApiError::Internal(e.to_string()),
            AppError::Auth(_) | AppError::Access(AccessError::NotAuthenticated) => {
                ApiError::Unauthorized(e.to_string())
            }
            AppError::Access(AccessError::AlreadyLoggedIn) => ApiError::Conflict(e.to_string()),
            AppError::NoActiveSession => ApiError::NotFound(e.to_string()),
            AppError::Session(inner) => inner.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
