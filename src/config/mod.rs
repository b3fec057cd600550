//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `UX_STUDY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use ux_study_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod server;
mod study;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use server::{LogFormat, ServerConfig};
pub use study::StudySettings;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only `ai.gemini_api_key` is required, and only
/// while the Gemini provider is selected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Text generation provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Study pacing and persona source
    #[serde(default)]
    pub study: StudySettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `UX_STUDY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `UX_STUDY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `UX_STUDY__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `UX_STUDY__STUDY__STAGE_DELAY_MS=500` -> `study.stage_delay_ms = 500`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("UX_STUDY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.study.validate()?;
        Ok(())
    }
}
