//! Study command and query handlers.
//!
//! Thin adapters from transport-level commands to the study runtime.

mod get_study;
mod reset_study;
mod send_message;
mod start_study;

pub use get_study::GetStudyHandler;
pub use reset_study::ResetStudyHandler;
pub use send_message::{SendMessageCommand, SendMessageHandler};
pub use start_study::{StartStudyCommand, StartStudyHandler};
