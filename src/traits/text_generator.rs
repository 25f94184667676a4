use async_trait::async_trait;

use crate::models::error::NetworkError;
use crate::models::types::{ApiKey, GenerationParams, RequestPayload};

/// Capability to turn a system instruction plus a user turn into text.
///
/// The itinerary service depends on this trait only, so the vendor client can
/// be swapped for a fake in tests. Implementations must be thread-safe
/// (`Send + Sync`) and perform at most one outbound call per invocation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw generated text (untrimmed).
    async fn generate(
        &self,
        payload: &RequestPayload,
        params: &GenerationParams,
        api_key: &ApiKey,
    ) -> Result<String, NetworkError>;
}
