//! Mock text generator for testing.
//!
//! Provides a configurable mock implementation of the TextGenerator port,
//! allowing tests to run without calling the real Gemini API.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Per-response delays for ordering and timeout tests
//! - Error injection
//! - Prompt tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockTextGenerator::new()
//!     .with_response("Key insight: fix the cart icon")
//!     .with_delay(Duration::from_millis(100));
//!
//! let text = generator.generate("analyze").await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{GenerationError, GeneratorInfo, TextGenerator};

/// Text returned once the scripted queue is exhausted.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

/// Mock text generator for testing.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Simulated latency applied when a response has none of its own.
    delay: Duration,
    /// Prompts received, in call order.
    calls: Arc<Mutex<Vec<String>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub result: Result<String, GenerationError>,
    pub delay: Option<Duration>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()), None)
    }

    /// Adds a successful response that takes `delay` to arrive.
    pub fn with_delayed_response(self, text: impl Into<String>, delay: Duration) -> Self {
        self.push(Ok(text.into()), Some(delay))
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.push(Err(error), None)
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn push(self, result: Result<String, GenerationError>, delay: Option<Duration>) -> Self {
        lock(&self.responses).push_back(MockResponse { result, delay });
        self
    }

    /// Returns the number of calls made to this generator.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all prompts received.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses).pop_front().unwrap_or_else(|| MockResponse {
            result: Ok(DEFAULT_MOCK_RESPONSE.to_string()),
            delay: None,
        })
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        lock(&self.calls).push(prompt.to_string());

        let response = self.next_response();
        let delay = response.delay.unwrap_or(self.delay);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        response.result
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("mock", "mock-model-1")
    }
}
