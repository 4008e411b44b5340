//! API Server Module
//!
//! Thin HTTP adapter over `GradingService`. Handlers only translate between
//! multipart/JSON and the service's types; all rules live in the service.

use crate::{
    config::ApiConfig,
    error::GradingError,
    service::GradingService,
    types::{SessionId, TaskId, TaskSnapshot, UploadedImage},
};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    service: GradingService,
}

pub struct Server {
    config: ApiConfig,
    service: GradingService,
}

impl Server {
    pub fn new(config: ApiConfig, service: GradingService) -> Self {
        Self { config, service }
    }

    /// Bind to the configured address and serve until the process exits
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.service, self.config.max_request_bytes);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

pub fn router(service: GradingService, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/api/grading/upload-prompt", post(upload_prompt))
        .route("/api/grading/upload-essays/:session_id", post(upload_essays))
        .route("/api/grading/process-batch/:session_id", post(process_batch))
        .route("/api/grading/status/:task_id", get(task_status))
        .route("/api/grading/report/:task_id", get(export_report))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .with_state(AppState { service })
}

#[derive(Debug, Serialize)]
struct PromptUploaded {
    session_id: SessionId,
}

#[derive(Debug, Serialize)]
struct EssaysUploaded {
    session_id: SessionId,
    uploaded_count: usize,
}

#[derive(Debug, Serialize)]
struct BatchAccepted {
    task_id: TaskId,
    total_essays: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error returned by handlers, rendered as `{ "error": ... }`
pub struct ApiError(GradingError);

impl From<GradingError> for ApiError {
    fn from(err: GradingError) -> Self {
        Self(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self(GradingError::Validation(format!("malformed upload: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GradingError::Validation(_) => StatusCode::BAD_REQUEST,
            GradingError::NotFound { .. } => StatusCode::NOT_FOUND,
            GradingError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

async fn upload_prompt(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PromptUploaded>, ApiError> {
    let prompt = read_images(multipart).await?.into_iter().next();
    let session_id = state.service.upload_prompt(prompt).await?;
    Ok(Json(PromptUploaded { session_id }))
}

async fn upload_essays(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<EssaysUploaded>, ApiError> {
    let essays = read_images(multipart).await?;
    let uploaded_count = state.service.upload_essays(&session_id, essays).await?;
    Ok(Json(EssaysUploaded {
        session_id,
        uploaded_count,
    }))
}

async fn process_batch(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<BatchAccepted>), ApiError> {
    let (task_id, total_essays) = state.service.start_processing(&session_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(BatchAccepted {
            task_id,
            total_essays,
        }),
    ))
}

async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskSnapshot>, ApiError> {
    Ok(Json(state.service.task_status(&task_id).await?))
}

async fn export_report(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let text = state.service.export_report(&task_id).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// Collect every file part of a multipart body, in order
async fn read_images(mut multipart: Multipart) -> Result<Vec<UploadedImage>, ApiError> {
    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        images.push(UploadedImage::new(filename, content_type, bytes));
    }
    Ok(images)
}
