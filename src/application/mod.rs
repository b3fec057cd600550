//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `study_runtime` hosts the actor that owns the study state; the handlers
//! translate commands into runtime requests.

pub mod handlers;
mod study_runtime;

pub use handlers::{
    GetStudyHandler, ResetStudyHandler, SendMessageCommand, SendMessageHandler,
    StartStudyCommand, StartStudyHandler,
};
pub use study_runtime::{StudyHandle, StudyRuntime, StudyRuntimeConfig};
