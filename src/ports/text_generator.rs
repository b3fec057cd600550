//! Text Generator Port - Interface for the external text-generation call.
//!
//! The study runtime issues exactly two kinds of prompt: study-wide insights
//! and chat replies. Both are a single prompt string in, a single text out.
//!
//! # Design
//!
//! - One-shot, non-streaming completion
//! - Implementations never retry; callers substitute a fixed apology on error
//! - Error variants distinguish transport failures from upstream rejections
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoGenerator;
//!
//! #[async_trait]
//! impl TextGenerator for EchoGenerator {
//!     async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
//!         Ok(prompt.to_string())
//!     }
//!
//!     fn generator_info(&self) -> GeneratorInfo {
//!         GeneratorInfo::new("echo", "echo")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;

/// Port for the external text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Name and model of the backing provider, for logging.
    fn generator_info(&self) -> GeneratorInfo;
}

/// Provider identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorInfo {
    /// Provider name (e.g., "gemini", "canned").
    pub name: String,
    /// Model identifier (e.g., "gemini-2.0-flash").
    pub model: String,
}

impl GeneratorInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Text generation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Upstream error message, if any.
        message: String,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Upstream quota or rate limit hit.
    #[error("rate limited")]
    RateLimited,

    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response parsed but carried no text.
    #[error("empty response")]
    EmptyResponse,
}

impl GenerationError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Short machine-readable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::AuthenticationFailed => "authentication",
            Self::RateLimited => "rate_limited",
            Self::Parse(_) => "parse",
            Self::EmptyResponse => "empty_response",
        }
    }
}
