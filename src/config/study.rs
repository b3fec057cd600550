//! Study pacing and persona configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::study::{PersonaFeedback, PersonaLoadError};

use super::error::ValidationError;

/// Study configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StudySettings {
    /// Delay between consecutive stages in milliseconds
    #[serde(default = "default_stage_delay")]
    pub stage_delay_ms: u64,

    /// Word limit written into chat reply prompts
    #[serde(default = "default_reply_word_limit")]
    pub reply_word_limit: u32,

    /// Optional YAML file replacing the built-in persona transcripts
    pub personas_path: Option<PathBuf>,
}

impl StudySettings {
    /// Get stage delay as Duration
    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }

    /// Loads the configured persona file, or the built-in set when none is set.
    pub fn load_personas(&self) -> Result<PersonaFeedback, PersonaLoadError> {
        match &self.personas_path {
            Some(path) => PersonaFeedback::load(path),
            None => Ok(PersonaFeedback::builtin()),
        }
    }

    /// Validate study configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stage_delay_ms == 0 || self.stage_delay_ms > 60_000 {
            return Err(ValidationError::InvalidStageDelay);
        }
        if self.reply_word_limit == 0 || self.reply_word_limit > 2000 {
            return Err(ValidationError::InvalidReplyWordLimit);
        }
        Ok(())
    }
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            stage_delay_ms: default_stage_delay(),
            reply_word_limit: default_reply_word_limit(),
            personas_path: None,
        }
    }
}

fn default_stage_delay() -> u64 {
    2000
}

fn default_reply_word_limit() -> u32 {
    150
}
