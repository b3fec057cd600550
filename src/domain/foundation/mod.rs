//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the study domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{require_non_blank, ValidationError};
pub use ids::{MessageId, StudyId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
