//! HTTP surface over the posting subsystem.
//!
//! Thin handlers only: request bodies are deserialized, handed to the shared
//! [`Poster`], and its structured results serialized back. Draft resolution
//! from scheduler records happens in the caller; this layer accepts resolved
//! drafts. Failures arrive as `{success: false, error}` payloads with status
//! 200, matching the subsystem's no-throw boundary.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::info;

use crosspost::{PostDraft, PostKind, PostResult, Poster, SessionStatus};

type SharedPoster = Arc<Poster>;

/// Builds the full application router around one shared poster.
pub fn router(poster: SharedPoster) -> Router {
    Router::new()
        .route("/api/reddit/is-running", get(is_running))
        .route("/api/reddit/login", post(start_login))
        .route("/api/reddit/check-login", post(check_login))
        .route("/api/reddit/session/status", post(session_status))
        .route("/api/reddit/session", delete(clear_session))
        .route("/api/reddit/post", post(submit_post))
        .route("/api/reddit/progress", get(progress_events))
        .with_state(poster)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub subreddit: String,
    pub kind: PostKind,
    pub caption: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub flair: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunningResponse {
    is_running: bool,
}

#[derive(Debug, Serialize)]
struct AckResponse {
    success: bool,
}

fn identity_of(params: Option<Json<IdentityParams>>) -> Option<String> {
    params.and_then(|Json(p)| p.user_id)
}

async fn is_running(State(poster): State<SharedPoster>) -> Json<RunningResponse> {
    Json(RunningResponse {
        is_running: poster.is_running(),
    })
}

/// Kicks off a login run in the background; the username is not returned at
/// this layer. Callers poll `check-login` for the outcome.
async fn start_login(
    State(poster): State<SharedPoster>,
    params: Option<Json<IdentityParams>>,
) -> Json<AckResponse> {
    if poster.is_login_running() {
        return Json(AckResponse { success: false });
    }
    let identity = identity_of(params);
    info!(target = "crosspostd", identity = identity.as_deref().unwrap_or("default"), "login requested");
    let runner = Arc::clone(&poster);
    tokio::spawn(async move {
        let _ = runner.perform_login(identity.as_deref()).await;
    });
    Json(AckResponse { success: true })
}

async fn check_login(
    State(poster): State<SharedPoster>,
    params: Option<Json<IdentityParams>>,
) -> Json<crosspost::LoginStatus> {
    let identity = identity_of(params);
    Json(poster.check_login_status(identity.as_deref()).await)
}

async fn session_status(
    State(poster): State<SharedPoster>,
    params: Option<Json<IdentityParams>>,
) -> Json<SessionStatus> {
    let identity = identity_of(params);
    Json(poster.session_status(identity.as_deref()))
}

async fn clear_session(
    State(poster): State<SharedPoster>,
    params: Option<Json<IdentityParams>>,
) -> Json<AckResponse> {
    let identity = identity_of(params);
    Json(AckResponse {
        success: poster.clear_session(identity.as_deref()),
    })
}

async fn submit_post(
    State(poster): State<SharedPoster>,
    Json(request): Json<SubmitRequest>,
) -> Json<PostResult> {
    let draft = PostDraft {
        kind: request.kind,
        target_community: request.subreddit,
        caption: request.caption,
        url: request.url,
        flair: request.flair,
    };
    Json(poster.post(request.user_id.as_deref(), draft).await)
}

/// Live progress of the current run as server-sent events.
async fn progress_events(
    State(poster): State<SharedPoster>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(poster.subscribe())
        .filter_map(|event| event.ok())
        .map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
