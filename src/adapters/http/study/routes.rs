//! HTTP routes for study endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_study, reset_study, send_message, start_study, StudyHandlers};
use super::stream::study_stream;

/// Creates the study router, to be nested under `/api/study`.
pub fn study_routes(handlers: StudyHandlers) -> Router {
    Router::new()
        .route("/", get(get_study).post(start_study).delete(reset_study))
        .route("/messages", post(send_message))
        .route("/stream", get(study_stream))
        .with_state(handlers)
}
