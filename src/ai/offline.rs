use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use async_trait::async_trait;

/// Provider that never answers. Every model then takes the local synthetic
/// path, which makes runs reproducible without network access.
#[derive(Clone, Debug, Default)]
pub struct OfflineProvider;

#[async_trait]
impl LlmProvider for OfflineProvider {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse, LlmError> {
        Err(LlmError::Unavailable("offline provider".to_string()))
    }
}
