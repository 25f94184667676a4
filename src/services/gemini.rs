use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::models::config::LlmConfig;
use crate::models::error::NetworkError;
use crate::models::types::{ApiKey, GenerationParams, RequestPayload};
use crate::services::utils::trim_with_ellipsis;
use crate::traits::text_generator::TextGenerator;

/// `TextGenerator` backed by the Gemini `generateContent` REST endpoint.
#[derive(Builder)]
pub struct GeminiClient {
    client: Client,
    #[builder(into)]
    base_url: String,
    #[builder(default = 200)]
    preview_chars: usize,
}

impl GeminiClient {
    pub fn from_config(llm: &LlmConfig) -> anyhow::Result<Self> {
        let base = Url::parse(llm.base_url())
            .map_err(|e| anyhow::anyhow!("invalid llm.base_url {}: {}", llm.base_url(), e))?;
        let mut builder = Client::builder();
        if let Some(secs) = llm.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        info!(
            base_url = %base,
            timeout = %llm.request_timeout_secs.map_or("None".to_string(), |t| t.to_string()),
            "gemini client configured"
        );
        Ok(Self::builder()
            .client(client)
            .base_url(base.as_str().trim_end_matches('/'))
            .preview_chars(llm.preview_chars())
            .build())
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        payload: &RequestPayload,
        params: &GenerationParams,
        api_key: &ApiKey,
    ) -> Result<String, NetworkError> {
        let body = GenerateContentRequest::from_payload(payload, params);
        let preview = trim_with_ellipsis(&payload.user_content, self.preview_chars);
        info!(
            model = %params.model,
            prompt_len = payload.user_content.len(),
            prompt_preview = %preview,
            "gemini: generate request"
        );

        let response = self
            .client
            .post(self.endpoint(&params.model))
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "gemini: HTTP error");
                NetworkError::Transport(e)
            })?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            let body = trim_with_ellipsis(
                &api_error_message(&raw).unwrap_or(raw),
                self.preview_chars,
            );
            warn!(status = status.as_u16(), body = %body, "gemini: error status");
            return Err(NetworkError::Status { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| NetworkError::MalformedResponse(e.to_string()))?;
        let text = parsed.into_text()?;

        let response_preview = trim_with_ellipsis(&text, self.preview_chars);
        info!(
            model = %params.model,
            response_len = text.len(),
            response_preview = %response_preview,
            "gemini: generate response"
        );
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_payload(payload: &'a RequestPayload, params: &GenerationParams) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &payload.system_instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &payload.user_content }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String, NetworkError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(NetworkError::MalformedResponse(format!("prompt blocked: {}", reason)));
        }
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();
        let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
        let text = texts.concat();
        if text.trim().is_empty() {
            return Err(NetworkError::MalformedResponse(
                "response contained no candidate text".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Pulls `error.message` out of a Gemini error body, if it has one.
fn api_error_message(raw: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(raw).ok()?;
    v.get("error")?.get("message")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_wire_format() {
        let payload = RequestPayload::builder()
            .system_instruction("be brief")
            .user_content("Create a detailed itinerary based on: Rome")
            .build();
        let params = GenerationParams::default();
        let body = serde_json::to_value(GenerateContentRequest::from_payload(&payload, &params)).unwrap();
        assert_eq!(
            body,
            json!({
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "contents": [{"role": "user", "parts": [{"text": "Create a detailed itinerary based on: Rome"}]}],
                "generationConfig": {"maxOutputTokens": 2000, "temperature": 0.7f32}
            })
        );
    }

    #[test]
    fn joins_all_parts_of_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Day 1\n"}, {"text": "Day 2"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(resp.into_text().unwrap(), "Day 1\nDay 2");
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        let err = resp.into_text().unwrap_err();
        assert!(matches!(err, NetworkError::MalformedResponse(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn whitespace_only_candidate_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "  \n "}, {"text": "\t"}]}}]
        }))
        .unwrap();
        assert!(matches!(resp.into_text(), Err(NetworkError::MalformedResponse(_))));
    }

    #[test]
    fn extracts_api_error_message() {
        let raw = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(raw).as_deref(), Some("API key not valid"));
        assert_eq!(api_error_message("<html>"), None);
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::builder()
            .client(Client::new())
            .base_url("http://localhost:1234/v1beta/")
            .build();
        assert_eq!(
            client.endpoint("gemini-2.0-flash-exp"),
            "http://localhost:1234/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }
}
