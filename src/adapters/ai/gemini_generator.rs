//! Gemini Generator - Implementation of TextGenerator for Google's Gemini API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let generator = GeminiTextGenerator::new(config)?;
//! ```
//!
//! # Wire format
//!
//! `POST {base_url}/{model}:generateContent?key=<key>` with body
//! `{"contents":[{"parts":[{"text": prompt}]}]}`. The reply text is read from
//! `candidates[0].content.parts[0].text`. Failures are reported once; this
//! adapter never retries.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{GenerationError, GeneratorInfo, TextGenerator};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the Gemini generator.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.0-flash").
    pub model: String,
    /// Base URL up to and excluding the model segment.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API generator implementation.
pub struct GeminiTextGenerator {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextGenerator {
    /// Creates a new Gemini generator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL, without the key.
    fn endpoint_url(&self) -> String {
        format!("{}/{}:generateContent", self.config.base_url, self.config.model)
    }

    async fn send_request(&self, prompt: &str) -> Result<Response, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        self.client
            .post(self.endpoint_url())
            .query(&[("key", self.config.api_key())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the key; keep it out of error text.
                let e = e.without_url();
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    GenerationError::network(format!("Connection failed: {e}"))
                } else {
                    GenerationError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(map_http_error(status, &error_body))
    }

    async fn parse_response(&self, response: Response) -> Result<String, GenerationError> {
        let response = self.handle_response_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::parse(format!("Failed to parse Gemini response: {e}")))?;

        extract_text(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.send_request(prompt).await?;
        self.parse_response(response).await
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("gemini", &self.config.model)
    }
}

fn map_http_error(status: StatusCode, body: &str) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        _ => {
            let message = serde_json::from_str::<ErrorWrapper>(body)
                .ok()
                .and_then(|wrapper| {
                    let message = wrapper.error.message?;
                    Some(match wrapper.error.status {
                        Some(status_text) if !status_text.is_empty() => {
                            format!("{status_text}: {message}")
                        }
                        _ => message,
                    })
                })
                .unwrap_or_else(|| body.to_string());
            GenerationError::status(status.as_u16(), message)
        }
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(GenerationError::EmptyResponse)?;

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

// ════════════════════════════════════════════════════════════════════════════════
// Gemini API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, GenerationError> {
        extract_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn config_defaults_to_flash_model() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let generator = GeminiTextGenerator::new(
            GeminiConfig::new("key")
                .with_base_url("http://localhost:9000/models/")
                .with_model("gemini-test"),
        )
        .unwrap();
        assert_eq!(
            generator.endpoint_url(),
            "http://localhost:9000/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn config_debug_does_not_leak_key() {
        let config = GeminiConfig::new("super-secret-key");
        assert!(!format!("{config:?}").contains("super-secret-key"));
    }

    #[test]
    fn request_serializes_to_contents_parts_text() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    mod response_parsing {
        use super::*;

        #[test]
        fn extracts_first_candidate_first_part() {
            let text = parse(
                r#"{"candidates":[
                    {"content":{"parts":[{"text":"first"},{"text":"second"}]}},
                    {"content":{"parts":[{"text":"other"}]}}
                ]}"#,
            );
            assert_eq!(text.unwrap(), "first");
        }

        #[test]
        fn missing_candidates_is_empty_response() {
            assert_eq!(parse("{}"), Err(GenerationError::EmptyResponse));
            assert_eq!(parse(r#"{"candidates":[]}"#), Err(GenerationError::EmptyResponse));
        }

        #[test]
        fn blank_text_is_empty_response() {
            assert_eq!(
                parse(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#),
                Err(GenerationError::EmptyResponse)
            );
        }
    }

    mod error_mapping {
        use super::*;

        #[test]
        fn auth_statuses_map_to_authentication_failed() {
            assert_eq!(
                map_http_error(StatusCode::UNAUTHORIZED, ""),
                GenerationError::AuthenticationFailed
            );
            assert_eq!(
                map_http_error(StatusCode::FORBIDDEN, ""),
                GenerationError::AuthenticationFailed
            );
        }

        #[test]
        fn too_many_requests_maps_to_rate_limited() {
            assert_eq!(
                map_http_error(StatusCode::TOO_MANY_REQUESTS, "{}"),
                GenerationError::RateLimited
            );
        }

        #[test]
        fn other_statuses_carry_upstream_message() {
            let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
            assert_eq!(
                map_http_error(StatusCode::BAD_REQUEST, body),
                GenerationError::status(400, "INVALID_ARGUMENT: API key not valid")
            );
        }

        #[test]
        fn unparseable_error_body_is_kept_verbatim() {
            assert_eq!(
                map_http_error(StatusCode::BAD_GATEWAY, "upstream down"),
                GenerationError::status(502, "upstream down")
            );
        }
    }
}
