use crate::ai::cerebras::CerebrasProvider;
use crate::ai::offline::OfflineProvider;
use crate::ai::openrouter::OpenRouterProvider;
use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Clone)]
pub enum InnerProvider {
    OpenRouter(OpenRouterProvider),
    Cerebras(CerebrasProvider),
    Offline(OfflineProvider),
}

#[derive(Clone)]
pub struct AnyProvider {
    inner: InnerProvider,
}

impl AnyProvider {
    /// `timeout` caps each HTTP request made by the selected provider.
    pub fn from_env(timeout: Duration) -> Result<Self, LlmError> {
        let which = std::env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "openrouter".to_string())
            .to_lowercase();
        Self::by_name(&which, timeout)
    }

    pub fn by_name(which: &str, timeout: Duration) -> Result<Self, LlmError> {
        let inner = match which {
            "cerebras" => InnerProvider::Cerebras(CerebrasProvider::from_env(timeout)?),
            "offline" | "none" => InnerProvider::Offline(OfflineProvider),
            _ => InnerProvider::OpenRouter(OpenRouterProvider::from_env(timeout)?),
        };
        Ok(Self { inner })
    }

    pub fn name(&self) -> &'static str {
        match &self.inner {
            InnerProvider::OpenRouter(_) => "openrouter",
            InnerProvider::Cerebras(_) => "cerebras",
            InnerProvider::Offline(_) => "offline",
        }
    }
}

#[async_trait]
impl LlmProvider for AnyProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            InnerProvider::OpenRouter(p) => p.chat(req).await,
            InnerProvider::Cerebras(p) => p.chat(req).await,
            InnerProvider::Offline(p) => p.chat(req).await,
        }
    }
}
