//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod study;

pub use study::{
    GetStudyHandler, ResetStudyHandler, SendMessageCommand, SendMessageHandler,
    StartStudyCommand, StartStudyHandler,
};
