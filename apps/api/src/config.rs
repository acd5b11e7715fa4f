use anyhow::{bail, Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_CHAT_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Skips identity verification and resolves a fixed or header-supplied
    /// identity. Never enable outside local development.
    pub dev_auth_enabled: bool,
    /// Makes 500-class responses carry failure detail instead of generic text.
    pub debug_errors: bool,
    pub identity_verify_url: Option<String>,
    pub identity_api_key: Option<String>,
    pub max_upload_bytes: usize,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let dev_auth_enabled = flag_env("DEV_AUTH_ENABLED");
        let identity_verify_url = optional_env("IDENTITY_VERIFY_URL");
        let identity_api_key = optional_env("IDENTITY_API_KEY");
        if !dev_auth_enabled && identity_verify_url.is_none() {
            bail!("IDENTITY_VERIFY_URL is required unless DEV_AUTH_ENABLED=true");
        }

        let api_key = optional_env("LLM_API_KEY");
        // An API key without an explicit chat URL implies the default
        // OpenAI-compatible endpoint.
        let chat_url = optional_env("LLM_CHAT_URL")
            .or_else(|| api_key.as_ref().map(|_| DEFAULT_CHAT_URL.to_string()));
        let llm = LlmConfig {
            api_key,
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            chat_url,
            generate_url: optional_env("LLM_GENERATE_URL"),
            request_url: optional_env("LLM_REQUEST_URL"),
            fallback_url: optional_env("LLM_FALLBACK_URL"),
        };

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a number of megabytes")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            dev_auth_enabled,
            debug_errors: flag_env("DEBUG_ERRORS"),
            identity_verify_url,
            identity_api_key,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            llm,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Absent and empty are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag_env(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
