//! HTTP adapter for the study endpoints.

mod dto;
mod handlers;
mod routes;
mod stream;

pub use dto::{
    ErrorResponse, MessageResponse, SendMessageRequest, StartStudyRequest, StudyConfigResponse,
    StudyResponse,
};
pub use handlers::StudyHandlers;
pub use routes::study_routes;
