#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use itinera::models::config::LlmConfig;
use itinera::models::error::NetworkError;
use itinera::models::types::{ApiKey, GenerationParams, RequestPayload};
use itinera::services::itinerary::ItineraryService;
use itinera::traits::text_generator::TextGenerator;
use itinera::web::{AppState, create_app};
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MANHATTAN_PROMPT: &str = "date night 6-9pm in downtown Manhattan, Italian, $60pp";
pub const MANHATTAN_ITINERARY: &str =
    "Day 1\n6:00 PM - Arrival\n6:30 PM - Dinner at Trattoria (approx $50pp)";

/// What the fake generator should answer with.
pub enum Reply {
    Text(String),
    Fail(String),
}

/// In-memory `TextGenerator` that records every call.
pub struct FakeGenerator {
    reply: Reply,
    calls: AtomicUsize,
    last_payload: Mutex<Option<RequestPayload>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(message.to_string()),
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<RequestPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        payload: &RequestPayload,
        _params: &GenerationParams,
        _api_key: &ApiKey,
    ) -> Result<String, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Fail(m) => Err(NetworkError::Other(m.clone())),
        }
    }
}

pub fn service_with(generator: Arc<FakeGenerator>, api_key: Option<&str>) -> ItineraryService {
    ItineraryService::builder()
        .generator(generator)
        .maybe_api_key(api_key.and_then(ApiKey::new))
        .build()
        .unwrap()
}

pub fn app_with(generator: Arc<FakeGenerator>, api_key: Option<&str>) -> axum::Router {
    let state = AppState::new(Arc::new(service_with(generator, api_key))).unwrap();
    create_app(state)
}

/// LLM config pointing at a wiremock server.
pub fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        model: Some("gemini-2.0-flash".to_string()),
        base_url: Some(format!("{}/v1beta", server.uri())),
        api_key: Some("TESTKEY".to_string()),
        request_timeout_secs: Some(10),
        log_prompt_preview_chars: Some(40),
        ..Default::default()
    }
}

pub fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": {
                    "parts": [{"text": text}],
                    "role": "model"
                },
                "finishReason": "STOP",
                "index": 0
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 8,
            "candidatesTokenCount": 312,
            "totalTokenCount": 320
        }
    })
}

pub async fn mount_gemini_generate(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path_regex(r".*:generateContent$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json; charset=UTF-8")
                .set_body_json(gemini_body(text)),
        )
        .expect(1)
        .named("Gemini Generate Content")
        .mount(server)
        .await;
}

pub async fn mount_gemini_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path_regex(r".*:generateContent$"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}
