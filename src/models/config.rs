use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::models::types::{ApiKey, GenerationParams};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_PREVIEW_CHARS: usize = 200;
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a professional travel itinerary planner. \
Create detailed, well-structured itineraries that are easy to read and follow. \
For each day and activity, include timing, descriptions, costs, and transportation \
suggestions where relevant. Be specific and practical.";

/// Tera template for the user turn; `prompt` is the only variable.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Create a detailed itinerary based on: {{ prompt }}";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid server.bind address: {}", self.bind))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
    pub log_prompt_preview_chars: Option<usize>,
    pub system_instruction: Option<String>,
    pub prompt_template: Option<String>, // Tera template, `{{ prompt }}`
}

impl LlmConfig {
    /// Resolves the credential once: `llm.api_key` first, then `GEMINI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<ApiKey> {
        self.api_key
            .clone()
            .and_then(ApiKey::new)
            .or_else(|| std::env::var(API_KEY_ENV).ok().and_then(ApiKey::new))
    }

    pub fn generation_params(&self) -> GenerationParams {
        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        let clamped = temperature.clamp(0.0, 2.0);
        if clamped != temperature {
            warn!(configured = temperature, used = clamped, "llm.temperature out of range, clamped");
        }
        GenerationParams::builder()
            .model(self.model.clone().filter(|m| !m.trim().is_empty()).unwrap_or_else(|| DEFAULT_MODEL.to_string()))
            .max_output_tokens(self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS).max(1))
            .temperature(clamped)
            .build()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn preview_chars(&self) -> usize {
        self.log_prompt_preview_chars.unwrap_or(DEFAULT_PREVIEW_CHARS)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,             // used when RUST_LOG is not set
    pub file: Option<String>,      // optional log file, written without ANSI colors
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), file: None }
    }
}

/// Reads a YAML config. A missing file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let cfg: AppConfig = serde_yaml::from_str(content)?;
    Ok(cfg)
}
