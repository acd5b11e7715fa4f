//! LLM Gateway — the single point of entry for all model calls in BidForge.
//!
//! ARCHITECTURAL RULE: No other module may call an LLM endpoint directly.
//! All model interactions MUST go through this module.
//!
//! Providers differ in calling convention, so the gateway keeps a fixed,
//! ordered list of [`CallShape`]s. A shape participates only when its
//! endpoint URL is configured; the first configured shape carries the call.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod json;
pub mod prompts;

/// Model used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
/// Chat endpoint assumed when an API key is configured without an explicit
/// `LLM_CHAT_URL`.
pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

/// Calling conventions the gateway can speak, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// OpenAI-style chat completion: `messages` array, optional JSON mode.
    ChatCompletions,
    /// Prompt-in/text-out generation endpoint taking an `input` field.
    Generate,
    /// Minimal request endpoint taking a bare `prompt` field.
    Request,
    /// Plain POST to an operator-supplied URL; the body is read as text.
    HttpFallback,
}

impl CallShape {
    /// Probe order. `ChatCompletions` wins when several shapes are configured.
    pub const ORDER: [CallShape; 4] = [
        CallShape::ChatCompletions,
        CallShape::Generate,
        CallShape::Request,
        CallShape::HttpFallback,
    ];
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallShape::ChatCompletions => "chat_completions",
            CallShape::Generate => "generate",
            CallShape::Request => "request",
            CallShape::HttpFallback => "http_fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no LLM calling convention is configured")]
    Unavailable,

    #[error("LLM call via {shape} failed: {message}")]
    CallFailed { shape: CallShape, message: String },
}

/// Per-call knobs. `json_mode` asks chat-style endpoints for a JSON object
/// response; the other shapes ignore it.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub json_mode: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.0,
            json_mode: true,
        }
    }
}

/// Endpoint configuration for the gateway. Every URL is optional; with none
/// set, calls fail fast with [`GatewayError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub chat_url: Option<String>,
    pub generate_url: Option<String>,
    pub request_url: Option<String>,
    pub fallback_url: Option<String>,
}

/// Raw transport output before normalization.
enum RawResponse {
    Json(Value),
    Text(String),
}

/// The single LLM gateway shared by all services in BidForge.
/// Wraps the configured endpoints with retry logic and output normalization.
#[derive(Clone)]
pub struct LlmGateway {
    client: Client,
    config: LlmConfig,
}

impl LlmGateway {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    /// True when an API credential is present. Extraction paths check this
    /// to skip straight to their heuristic fallbacks.
    pub fn has_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// The shapes that are actually configured, in probe order.
    pub fn configured_shapes(&self) -> Vec<CallShape> {
        CallShape::ORDER
            .iter()
            .copied()
            .filter(|shape| self.endpoint_for(*shape).is_some())
            .collect()
    }

    fn endpoint_for(&self, shape: CallShape) -> Option<&str> {
        match shape {
            CallShape::ChatCompletions => self.config.chat_url.as_deref(),
            CallShape::Generate => self.config.generate_url.as_deref(),
            CallShape::Request => self.config.request_url.as_deref(),
            CallShape::HttpFallback => self.config.fallback_url.as_deref(),
        }
    }

    /// Sends `prompt` through the first configured shape and returns the
    /// normalized text output. A failure on the selected shape is returned
    /// as-is; later shapes are not tried, so behavior stays deterministic
    /// for a given configuration.
    pub async fn invoke(&self, prompt: &str, options: &CallOptions) -> Result<String, GatewayError> {
        for shape in CallShape::ORDER {
            let url = match self.endpoint_for(shape) {
                Some(url) => url.to_string(),
                None => continue,
            };

            let raw = self
                .attempt(shape, &url, prompt, options)
                .await
                .map_err(|message| GatewayError::CallFailed { shape, message })?;

            let text = normalize_output(&raw);
            debug!("LLM call via {} succeeded: {} chars", shape, text.len());
            return Ok(text);
        }

        Err(GatewayError::Unavailable)
    }

    /// One shape, up to MAX_RETRIES transport attempts. Retries on 429 and
    /// 5xx with exponential backoff; any other non-success status fails
    /// immediately.
    async fn attempt(
        &self,
        shape: CallShape,
        url: &str,
        prompt: &str,
        options: &CallOptions,
    ) -> Result<RawResponse, String> {
        let request_body = request_body(shape, &self.config.model, prompt, options);

        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(url).json(&request_body);
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(format!("HTTP error: {e}"));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM endpoint returned {}: {}", status, body);
                last_error = Some(format!("status {status}: {body}"));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Surface the provider's error message when it sends one
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.pointer("/error/message")
                            .and_then(Value::as_str)
                            .map(String::from)
                    })
                    .unwrap_or(body);
                return Err(format!("status {status}: {message}"));
            }

            return match shape {
                CallShape::HttpFallback => response
                    .text()
                    .await
                    .map(RawResponse::Text)
                    .map_err(|e| format!("failed to read response body: {e}")),
                _ => response
                    .json()
                    .await
                    .map(RawResponse::Json)
                    .map_err(|e| format!("failed to read response body: {e}")),
            };
        }

        Err(last_error.unwrap_or_else(|| format!("gave up after {MAX_RETRIES} attempts")))
    }
}

fn request_body(shape: CallShape, model: &str, prompt: &str, options: &CallOptions) -> Value {
    match shape {
        CallShape::ChatCompletions => {
            let mut body = json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
            });
            if options.json_mode {
                body["response_format"] = json!({ "type": "json_object" });
            }
            body
        }
        CallShape::Generate => json!({
            "model": model,
            "input": prompt,
            "max_tokens": options.max_tokens,
        }),
        CallShape::Request => json!({
            "model": model,
            "prompt": prompt,
        }),
        CallShape::HttpFallback => json!({
            "prompt": prompt,
            "model": model,
            "max_tokens": options.max_tokens,
        }),
    }
}

fn normalize_output(raw: &RawResponse) -> String {
    match raw {
        RawResponse::Text(text) => text.clone(),
        RawResponse::Json(value) => normalize_value(value),
    }
}

/// Collapses a provider JSON response into plain text. Total: every input
/// produces a string. Chat-style nested content is preferred, then the flat
/// `output_text` / `text` / `result` fields, then whole-value serialization.
/// Empty strings are treated as absent at every rung.
fn normalize_value(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }

    if value.is_object() {
        if let Some(content) = value.pointer("/choices/0/message/content") {
            if let Some(text) = content.as_str() {
                if !text.is_empty() {
                    return text.to_string();
                }
            } else if content.is_object() {
                if let Some(text) = content.get("text").and_then(Value::as_str) {
                    if !text.is_empty() {
                        return text.to_string();
                    }
                }
                if let Some(parts) = content.get("parts").and_then(Value::as_array) {
                    let joined: String = parts.iter().filter_map(Value::as_str).collect();
                    if !joined.is_empty() {
                        return joined;
                    }
                }
                return content.to_string();
            }
        }

        for key in ["output_text", "text", "result"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    value.to_string()
}
