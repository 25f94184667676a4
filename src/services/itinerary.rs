use std::sync::Arc;

use bon::bon;
use tera::{Context, Tera};
use tracing::{debug, info, warn};

use crate::models::config::{DEFAULT_PROMPT_TEMPLATE, DEFAULT_SYSTEM_INSTRUCTION, LlmConfig};
use crate::models::error::{ItineraryError, NetworkError};
use crate::models::types::{ApiKey, GenerationParams, ItineraryText, Prompt, RequestPayload};
use crate::traits::text_generator::TextGenerator;

const TEMPLATE_NAME: &str = "user_content";

/// Stand-in value rendered once at construction to locate the prompt slot.
const PROMPT_SLOT: &str = "\u{0}prompt\u{0}";

const EMPTY_ITINERARY: &str = "generation API returned an empty itinerary";

pub const MISSING_API_KEY: &str = "API key not configured (set llm.api_key or GEMINI_API_KEY)";

/// Turns a free-text travel request into itinerary text.
///
/// Validates the prompt, builds the payload, makes exactly one call through the
/// injected [`TextGenerator`] and maps every failure onto [`ItineraryError`].
pub struct ItineraryService {
    generator: Arc<dyn TextGenerator>,
    api_key: Option<ApiKey>,
    params: GenerationParams,
    system_instruction: String,
    /// Rendered template text before and after the prompt.
    prefix: String,
    suffix: String,
}

#[bon]
impl ItineraryService {
    /// Fails when `prompt_template` is not a usable Tera template, or when it
    /// does not insert `{{ prompt }}` exactly once and unmodified.
    #[builder]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        api_key: Option<ApiKey>,
        #[builder(default)] params: GenerationParams,
        system_instruction: Option<String>,
        prompt_template: Option<String>,
    ) -> Result<Self, tera::Error> {
        let template = prompt_template.unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string());
        let (prefix, suffix) = split_template(&template)?;

        let system_instruction = system_instruction
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());

        Ok(Self { generator, api_key, params, system_instruction, prefix, suffix })
    }

    pub fn from_config(
        generator: Arc<dyn TextGenerator>,
        llm: &LlmConfig,
    ) -> Result<Self, tera::Error> {
        let api_key = llm.resolve_api_key();
        if api_key.is_none() {
            warn!("no API key configured; itinerary requests will fail until one is set");
        }
        Self::builder()
            .generator(generator)
            .maybe_api_key(api_key)
            .params(llm.generation_params())
            .maybe_system_instruction(llm.system_instruction.clone())
            .maybe_prompt_template(llm.prompt_template.clone())
            .build()
    }

    /// Pure: same prompt in, same payload out.
    pub fn build_payload(&self, prompt: &Prompt) -> RequestPayload {
        let user_content = format!("{}{}{}", self.prefix, prompt.as_str(), self.suffix);
        RequestPayload::builder()
            .system_instruction(self.system_instruction.as_str())
            .user_content(user_content)
            .build()
    }

    pub async fn generate(&self, raw_prompt: &str) -> Result<ItineraryText, ItineraryError> {
        let prompt = Prompt::parse(raw_prompt)?;
        let payload = self.build_payload(&prompt);
        debug!(user_content_len = payload.user_content.len(), "itinerary: payload built");

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ItineraryError::Configuration(MISSING_API_KEY.to_string()))?;

        info!(model = %self.params.model, prompt_len = prompt.as_str().len(), "itinerary: calling generator");
        let text = self.generator.generate(&payload, &self.params, api_key).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(NetworkError::MalformedResponse(EMPTY_ITINERARY.to_string()).into());
        }
        info!(itinerary_len = text.len(), "itinerary: done");
        Ok(ItineraryText::from(text))
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Renders the user template once with a placeholder prompt and splits the
/// output around it, so request-time payload construction cannot fail.
fn split_template(template: &str) -> Result<(String, String), tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, template)?;
    let mut ctx = Context::new();
    ctx.insert("prompt", PROMPT_SLOT);
    let rendered = tera.render(TEMPLATE_NAME, &ctx)?;

    match rendered.split_once(PROMPT_SLOT) {
        Some((prefix, suffix)) if !suffix.contains(PROMPT_SLOT) => {
            Ok((prefix.to_string(), suffix.to_string()))
        }
        _ => Err(tera::Error::msg(format!(
            "llm.prompt_template must contain {{{{ prompt }}}} exactly once, unfiltered: {:?}",
            template
        ))),
    }
}
