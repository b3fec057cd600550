//! Staged UX study: setup, progress stages, chat transcript and persona routing.
//!
//! # Module Organization
//!
//! - `config` - validated setup form
//! - `stage` - five-stage progress FSM
//! - `persona` - static persona feedback transcripts
//! - `message` - chat transcript entries
//! - `prompts` - message templates, prompt building, `@mention` routing
//! - `state` - the study reducer (`StudyState`) with its events and effects
//! - `errors` - command rejection reasons

mod config;
mod errors;
mod message;
mod persona;
pub mod prompts;
mod stage;
mod state;

pub use config::{StudyConfig, StudySetupForm};
pub use errors::StudyError;
pub use message::{Message, Sender};
pub use persona::{FeedbackRole, FeedbackTurn, Persona, PersonaFeedback, PersonaId, PersonaLoadError};
pub use stage::Stage;
pub use state::{
    Effect, Event, GenerationOutcome, ReplyId, ReplyRequest, StudySnapshot, StudyState,
    StudyStatus,
};
