//! Model-assisted operand extraction backend.
//!
//! When the word tables cannot crack a challenge, the solver hands the
//! normalized text to a local model and asks for the operands and the
//! operation directly. The exchange is strict: one prompt, one JSON
//! object matching [`ModelExtraction`], no retries. The backend owns the
//! prompt, the response shape and the decode; callers only ever see a
//! typed extraction or an [`LlmError`].

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::extract::OperationTag;

/// Which HTTP dialect the configured endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Ollama generate API (`/api/generate`)
    #[default]
    Ollama,
    /// OpenAI-compatible chat API (`/v1/chat/completions`)
    Openai,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub backend: LlmBackend,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: LlmBackend::Ollama,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Failures of the model exchange
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("model backend is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("model output does not match the extraction shape: {0}")]
    InvalidJson(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// What the model must return for one challenge: the operands in the
/// order they appear and the operation the problem asks for. Anything
/// outside this shape is rejected at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelExtraction {
    pub numbers: Vec<f64>,
    pub operation: OperationTag,
}

/// Model seam the solver's fallback path plugs into
pub trait ChallengeModel: Send + Sync {
    /// One round trip: challenge text in, typed extraction out.
    fn extract_operands(&self, challenge: &str) -> Result<ModelExtraction, LlmError>;
}

const SYSTEM_PROMPT: &str = "You decode obfuscated arithmetic word problems. \
    Read the challenge, recover the numeric operands in the order they appear, \
    and name the arithmetic operation the problem asks for.";

const RESPONSE_SHAPE: &str =
    r#"{"numbers": [<number>, <number>, ...], "operation": "add" | "subtract" | "multiply" | "divide"}"#;

/// Decode the model's text output into a typed extraction.
pub(crate) fn decode_extraction(text: &str) -> Result<ModelExtraction, LlmError> {
    serde_json::from_str(text).map_err(|e| LlmError::InvalidJson(e.to_string()))
}

/// HTTP-backed challenge model
pub struct HttpChallengeModel {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl HttpChallengeModel {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;
        Ok(Self { config, client })
    }

    fn user_prompt(challenge: &str) -> String {
        format!(
            "Challenge text: {}\n\nRespond with valid JSON of this exact shape:\n{}",
            challenge, RESPONSE_SHAPE
        )
    }

    fn post(&self, url: &str, body: serde_json::Value) -> Result<serde_json::Value, LlmError> {
        let mut request = self.client.post(url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::HttpError(format!("request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!("HTTP {} from {}", response.status(), url)));
        }

        response
            .json()
            .map_err(|e| LlmError::HttpError(format!("unreadable response body: {}", e)))
    }

    fn generate_ollama(&self, challenge: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": format!("{}\n\n{}", SYSTEM_PROMPT, Self::user_prompt(challenge)),
            "stream": false,
            "format": "json",
        });

        let payload = self.post(&url, body)?;
        payload
            .get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }

    fn chat_openai(&self, challenge: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": Self::user_prompt(challenge)},
            ],
            "response_format": {"type": "json_object"},
        });

        let payload = self.post(&url, body)?;
        payload
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}

impl ChallengeModel for HttpChallengeModel {
    fn extract_operands(&self, challenge: &str) -> Result<ModelExtraction, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        let text = match self.config.backend {
            LlmBackend::Ollama => self.generate_ollama(challenge)?,
            LlmBackend::Openai => self.chat_openai(challenge)?,
        };
        tracing::debug!(backend = ?self.config.backend, "model responded");
        decode_extraction(&text)
    }
}

/// Scripted model for tests
pub struct FakeChallengeModel {
    responses: std::sync::Mutex<Vec<Result<ModelExtraction, LlmError>>>,
    call_count: std::sync::Mutex<usize>,
}

impl FakeChallengeModel {
    pub fn scripted(responses: Vec<Result<ModelExtraction, LlmError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
        }
    }

    /// A model that keeps answering with the same extraction.
    pub fn always(extraction: ModelExtraction) -> Self {
        Self::scripted(vec![Ok(extraction)])
    }

    /// A model that keeps failing the same way.
    pub fn always_error(error: LlmError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl ChallengeModel for FakeChallengeModel {
    fn extract_operands(&self, _challenge: &str) -> Result<ModelExtraction, LlmError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
