//! HTTP handlers for study endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    GetStudyHandler, ResetStudyHandler, SendMessageHandler, StartStudyHandler, StudyHandle,
};
use crate::domain::study::StudyError;

use super::dto::{ErrorResponse, SendMessageRequest, StartStudyRequest, StudyResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct StudyHandlers {
    start_handler: Arc<StartStudyHandler>,
    send_handler: Arc<SendMessageHandler>,
    reset_handler: Arc<ResetStudyHandler>,
    get_handler: Arc<GetStudyHandler>,
    study: StudyHandle,
}

impl StudyHandlers {
    /// Wires every handler to the same study runtime.
    pub fn new(study: StudyHandle) -> Self {
        Self {
            start_handler: Arc::new(StartStudyHandler::new(study.clone())),
            send_handler: Arc::new(SendMessageHandler::new(study.clone())),
            reset_handler: Arc::new(ResetStudyHandler::new(study.clone())),
            get_handler: Arc::new(GetStudyHandler::new(study.clone())),
            study,
        }
    }

    pub fn study(&self) -> &StudyHandle {
        &self.study
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/study - Current study snapshot
pub async fn get_study(State(handlers): State<StudyHandlers>) -> Response {
    let response = StudyResponse::from(handlers.get_handler.handle());
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/study - Submit the setup form
pub async fn start_study(
    State(handlers): State<StudyHandlers>,
    body: Result<Json<StartStudyRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_rejection(rejection),
    };

    match handlers.start_handler.handle(req.into()).await {
        Ok(snapshot) => (StatusCode::CREATED, Json(StudyResponse::from(snapshot))).into_response(),
        Err(e) => handle_study_error(e),
    }
}

/// POST /api/study/messages - Send a chat message
pub async fn send_message(
    State(handlers): State<StudyHandlers>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_rejection(rejection),
    };

    match handlers.send_handler.handle(req.into()).await {
        Ok(snapshot) => (StatusCode::ACCEPTED, Json(StudyResponse::from(snapshot))).into_response(),
        Err(e) => handle_study_error(e),
    }
}

/// DELETE /api/study - Reset to idle
pub async fn reset_study(State(handlers): State<StudyHandlers>) -> Response {
    match handlers.reset_handler.handle().await {
        Ok(snapshot) => (StatusCode::OK, Json(StudyResponse::from(snapshot))).into_response(),
        Err(e) => handle_study_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn handle_study_error(error: StudyError) -> Response {
    match &error {
        StudyError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(e.field(), e.to_string())),
        )
            .into_response(),
        StudyError::AlreadyStarted | StudyError::NotStarted => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(error.to_string())),
        )
            .into_response(),
        StudyError::RuntimeStopped => {
            tracing::error!("Study runtime is not running");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::unavailable(error.to_string())),
            )
                .into_response()
        }
    }
}

fn handle_rejection(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}
