//! Canned generator - offline stand-in for the Gemini API.
//!
//! Answers every prompt with the same fixed study summary so the service can
//! run a full study without credentials or network access.

use async_trait::async_trait;

use crate::ports::{GenerationError, GeneratorInfo, TextGenerator};

/// Summary of the TrueMeds cart study returned for every prompt.
pub const CANNED_INSIGHT: &str = "The user flow on TrueMeds suffers from discoverability and control issues. Autocomplete is aggressive, hindering precise searches. The \"Compare and Choose\" popup is confusing and its quantity selection is broken. Forcing login upon cart access, without a clear close option, is a major point of frustration. Prioritize fixing the broken elements, refining the search functionality, and granting users more control over their navigation, especially regarding login requirements. The user feels forced instead of guided, negatively impacting the overall experience. Clear communication and intuitive controls are key improvements.";

#[derive(Debug, Clone)]
pub struct CannedTextGenerator {
    text: String,
}

impl Default for CannedTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CannedTextGenerator {
    pub fn new() -> Self {
        Self::with_text(CANNED_INSIGHT)
    }

    /// Uses `text` as the fixed answer instead of the built-in summary.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextGenerator for CannedTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("canned", "fixed-insight")
    }
}
