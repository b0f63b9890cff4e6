//! Browser surface for chat sessions.
//!
//! The server keeps a table of live sessions keyed by id.  Each session sits behind its
//! own async mutex, so inputs to one session are processed one at a time while other
//! sessions proceed independently.  Routes:
//!
//! - `GET /` serves the chat page.
//! - `POST /api/sessions` starts a session.
//! - `GET /api/sessions/{id}` returns the transcript.
//! - `POST /api/sessions/{id}/messages` takes one input and returns the transcript.
//! - `DELETE /api/sessions/{id}` ends the session and discards its transcript.
//!
//! A session that sees no request for [`DEFAULT_IDLE_TIMEOUT`] is ended as well, so
//! tabs that never send their `DELETE` do not hold transcripts forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use uuid::Uuid;

use crate::chat::{ChatConfig, ChatSession};
use crate::completion::CompletionService;
use crate::transcript::Turn;

const INDEX_HTML: &str = include_str!("index.html");

/// How long a session may go without a request before it is ended.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

type SessionHandle<S> = Arc<tokio::sync::Mutex<ChatSession<S>>>;

struct Entry<S: CompletionService> {
    session: SessionHandle<S>,
    last_used: Instant,
}

type SessionTable<S> = HashMap<Uuid, Entry<S>>;

/// Shared state of the web server.
///
/// Every new session gets a clone of `service` and of `config`.
pub struct AppState<S: CompletionService> {
    config: Arc<ChatConfig>,
    service: S,
    idle_timeout: Duration,
    sessions: Arc<Mutex<SessionTable<S>>>,
}

impl<S: CompletionService + Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            service: self.service.clone(),
            idle_timeout: self.idle_timeout,
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<S: CompletionService + Clone> AppState<S> {
    /// State with no sessions.
    pub fn new(service: S, config: ChatConfig) -> Self {
        Self {
            config: Arc::new(config),
            service,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sets how long a session may sit idle before it is ended.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// The number of live sessions.
    pub fn session_count(&self) -> usize {
        self.table().len()
    }

    /// End every session idle for longer than the timeout.  Returns how many were ended.
    pub fn evict_idle(&self) -> usize {
        let mut table = self.table();
        Self::sweep(&mut table, self.idle_timeout)
    }

    fn sweep(table: &mut SessionTable<S>, idle_timeout: Duration) -> usize {
        let now = Instant::now();
        let before = table.len();
        table.retain(|_, entry| now.duration_since(entry.last_used) <= idle_timeout);
        before - table.len()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, SessionTable<S>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        let session = ChatSession::new(self.service.clone(), ChatConfig::clone(&self.config));
        let mut table = self.table();
        Self::sweep(&mut table, self.idle_timeout);
        table.insert(
            id,
            Entry {
                session: Arc::new(tokio::sync::Mutex::new(session)),
                last_used: Instant::now(),
            },
        );
        id
    }

    fn lookup(&self, id: Uuid) -> Result<SessionHandle<S>, WebError> {
        let mut table = self.table();
        Self::sweep(&mut table, self.idle_timeout);
        let entry = table.get_mut(&id).ok_or(WebError::SessionNotFound(id))?;
        entry.last_used = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    fn close(&self, id: Uuid) -> Result<(), WebError> {
        self.table()
            .remove(&id)
            .map(|_| ())
            .ok_or(WebError::SessionNotFound(id))
    }
}

/// Error returned by the JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    /// No live session has this id.
    SessionNotFound(Uuid),
    /// The request was well-formed JSON but not acceptable.
    Validation(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            WebError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("no session with id {id}"),
            ),
            WebError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };
        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

/// A session and its transcript, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    /// Session id.
    pub id: Uuid,
    /// The model answering in this session.
    pub model: String,
    /// Every turn, in order.
    pub turns: Vec<Turn>,
}

impl SessionView {
    fn of<S: CompletionService>(id: Uuid, session: &ChatSession<S>) -> Self {
        Self {
            id,
            model: session.model().to_string(),
            turns: session.transcript().all().to_vec(),
        }
    }
}

/// Body of `POST /api/sessions/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    /// The user's input.
    pub content: String,
}

/// GET / - The chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /api/sessions - Start a session.
pub async fn create_session<S>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<SessionView>)
where
    S: CompletionService + Clone + 'static,
{
    let id = state.open();
    let view = SessionView {
        id,
        model: state.config.model.to_string(),
        turns: Vec::new(),
    };
    (StatusCode::CREATED, Json(view))
}

/// GET /api/sessions/{id} - The full transcript.
pub async fn get_transcript<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, WebError>
where
    S: CompletionService + Clone + 'static,
{
    let handle = state.lookup(id)?;
    let session = handle.lock().await;
    Ok(Json(SessionView::of(id, &session)))
}

/// POST /api/sessions/{id}/messages - Process one input.
///
/// A failed model call is not an HTTP error; it shows up as the last turn of the
/// returned transcript.
pub async fn post_message<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<SessionView>, WebError>
where
    S: CompletionService + Clone + 'static,
{
    let input = body.content.trim();
    if input.is_empty() {
        return Err(WebError::Validation("content must not be empty".to_string()));
    }
    let handle = state.lookup(id)?;
    let mut session = handle.lock().await;
    session.respond(input).await;
    Ok(Json(SessionView::of(id, &session)))
}

/// DELETE /api/sessions/{id} - End the session.
pub async fn end_session<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError>
where
    S: CompletionService + Clone + 'static,
{
    state.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build the router for the chat page and its JSON API.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: CompletionService + Clone + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/api/sessions", post(create_session::<S>))
        .route(
            "/api/sessions/{id}",
            get(get_transcript::<S>).delete(end_session::<S>),
        )
        .route("/api/sessions/{id}/messages", post(post_message::<S>))
        .with_state(state)
}
