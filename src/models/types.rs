use bon::Builder;
use derive_more::{Display, From};
use serde::Serialize;

use crate::models::config::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::models::error::ItineraryError;

/// Free-text travel request as typed by the user.
///
/// Can only be obtained through [`Prompt::parse`], so a `Prompt` always holds
/// at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct Prompt(String);

impl Prompt {
    /// Validates raw user input. The text is kept verbatim (no trimming).
    pub fn parse(raw: &str) -> Result<Self, ItineraryError> {
        if raw.trim().is_empty() {
            return Err(ItineraryError::Validation);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plain text returned by the generation API, surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, From, Display)]
pub struct ItineraryText(String);

impl ItineraryText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Credential for the generation API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank keys, which count as "not configured".
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// What goes over the wire for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct RequestPayload {
    #[builder(into)]
    pub system_instruction: String,
    #[builder(into)]
    pub user_content: String,
}

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct GenerationParams {
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(default = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::builder().build()
    }
}
