//! Text Generator Adapters.
//!
//! Implementations of the TextGenerator port.
//!
//! ## Available Adapters
//!
//! - `GeminiTextGenerator` - Google Gemini `generateContent` over HTTP
//! - `CannedTextGenerator` - Fixed study summary for offline runs
//! - `MockTextGenerator` - Configurable mock for testing

mod canned_generator;
mod gemini_generator;
mod mock_generator;

pub use canned_generator::{CannedTextGenerator, CANNED_INSIGHT};
pub use gemini_generator::{
    GeminiConfig, GeminiTextGenerator, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
pub use mock_generator::{MockResponse, MockTextGenerator, DEFAULT_MOCK_RESPONSE};
