//! HTTP handlers for the upload form, processing, and result downloads.

use std::fmt;
use std::path::Path;

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::RedubError;
use crate::workflow::Stage;
use super::AppState;

pub const RESULT_ID_HEADER: &str = "x-result-id";

const UPLOAD_FORM: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>redub</title></head>
<body>
  <h1>Dub a video</h1>
  <form action="/process" method="post" enctype="multipart/form-data">
    <input type="file" name="video" accept="video/*" required>
    <select name="target_lang">
      <option value="en">English</option>
      <option value="hi">Hindi</option>
      <option value="te">Telugu</option>
      <option value="kn">Kannada</option>
      <option value="ta">Tamil</option>
    </select>
    <button type="submit">Dub</button>
  </form>
</body>
</html>
"#;

/// Lifecycle of one `/process` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Staged,
    Processing,
    Finalized,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// JSON error response: `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self { status: err.status(), message: format!("Invalid upload: {}", err.body_text()) }
    }
}

impl From<RedubError> for ApiError {
    fn from(err: RedubError) -> Self {
        if let RedubError::MissingArtifact { stage: Stage::Muxing, .. } = err {
            return Self::internal("Output video not generated");
        }
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// GET /: upload form
pub async fn index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn transition(request_id: Uuid, state: RequestState) {
    info!(request_id = %request_id, state = %state, "Request state changed");
}

/// POST /process: dub an uploaded video and stream the result back
pub async fn process(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    transition(request_id, RequestState::Received);

    let result = run_request(&state, request_id, multipart).await;
    if let Err(e) = &result {
        error!(request_id = %request_id, status = %e.status, "Request failed: {}", e.message);
        transition(request_id, RequestState::Failed);
    }
    result
}

async fn run_request(
    state: &AppState,
    request_id: Uuid,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError {
        status: e.status(),
        message: format!("Invalid upload: {}", e.body_text()),
    })?;

    // Dropped on every exit path, taking all intermediates with it
    let scratch = tempfile::tempdir().map_err(RedubError::from)?;
    let input_path = scratch.path().join("input.mp4");

    let mut has_video = false;
    let mut target_language = state.workflow.config().synthesizer.default_language.clone();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            // only a file part counts as the upload
            Some("video") if field.file_name().is_some() => {
                let mut file = tokio::fs::File::create(&input_path).await.map_err(RedubError::from)?;
                while let Some(chunk) = field.chunk().await? {
                    file.write_all(&chunk).await.map_err(RedubError::from)?;
                }
                file.flush().await.map_err(RedubError::from)?;
                has_video = true;
            }
            Some("target_lang") => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    target_language = value;
                }
            }
            _ => {}
        }
    }

    if !has_video {
        return Err(ApiError::bad_request("No video file uploaded"));
    }

    // Reject unsupported languages before the upload is processed
    state.workflow.synthesizer().resolve_language(&target_language)?;
    info!(request_id = %request_id, "Video saved: {}", input_path.display());
    transition(request_id, RequestState::Staged);

    transition(request_id, RequestState::Processing);
    let output_path = state
        .workflow
        .process_video(&input_path, scratch.path(), &target_language)
        .await?;

    let final_path = state.results.path_for(request_id);
    tokio::fs::copy(&output_path, &final_path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store output video: {}", e)))?;
    drop(scratch);

    state.results.insert(request_id, final_path.clone()).await;
    info!(request_id = %request_id, "Final video stored at: {}", final_path.display());
    transition(request_id, RequestState::Finalized);

    stream_video(request_id, &final_path).await
}

/// GET /results/{id}: download a stored result again
pub async fn download(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::bad_request(format!("Invalid result id: {}", id)))?;

    let result = state
        .results
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Result {} not found or expired", id)))?;

    stream_video(id, &result.path).await
}

async fn stream_video(id: Uuid, path: &Path) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to open output video: {}", e)))?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, "video/mp4".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name(id)),
        ),
        (HeaderName::from_static(RESULT_ID_HEADER), id.to_string()),
    ];

    Ok((headers, body).into_response())
}

fn download_name(id: Uuid) -> String {
    format!("dubbed_{}.mp4", id)
}
