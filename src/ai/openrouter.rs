use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use crate::ai::{build_llm_http_client, extract_completion_text, map_send_error, parse_api_keys};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_keys: Vec<String>,
    index: Arc<AtomicUsize>,
}

impl OpenRouterProvider {
    pub fn from_env(timeout: Duration) -> Result<Self, LlmError> {
        let api_keys = parse_api_keys(std::env::var("OPENROUTER_API_KEYS").ok());
        let api_key = match api_keys.first() {
            Some(k) => k.clone(),
            None => std::env::var("OPENROUTER_API_KEY")
                .map_err(|_| LlmError::MissingEnv("OPENROUTER_API_KEY"))?,
        };
        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        Ok(Self {
            client: build_llm_http_client(timeout)?,
            api_key,
            base_url,
            api_keys,
            index: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = build_llm_http_client(timeout).unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url,
            api_keys: Vec::new(),
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn next_key(&self) -> String {
        if self.api_keys.is_empty() {
            self.api_key.clone()
        } else {
            let i = self.index.fetch_add(1, Ordering::Relaxed);
            self.api_keys[i % self.api_keys.len()].clone()
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut body = serde_json::json!({
            "model": req.model,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
            "messages": [
                {"role": "system", "content": req.system},
                {"role": "user", "content": req.user}
            ]
        });
        if let Some(format) = &req.response_format {
            body["response_format"] = format.to_json();
        }

        let key = self.next_key();
        let resp = self
            .client
            .post(url)
            .bearer_auth(&key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LlmError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimited),
            _ => {}
        }

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Http(format!("{} {}", status.as_u16(), raw)));
        }

        let text = extract_completion_text(&raw)?;
        Ok(ChatResponse {
            text,
            raw: Some(raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stalled_server_times_out_after_one_attempt() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accepts connections and never answers
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                held.push(socket);
            }
        });

        let p = OpenRouterProvider::new(
            "k".to_string(),
            format!("http://{addr}/api/v1"),
            Duration::from_millis(200),
        );
        let req = ChatRequest {
            model: "m".to_string(),
            system: String::new(),
            user: String::new(),
            temperature: 0.0,
            max_tokens: 16,
            response_format: None,
        };
        let started = std::time::Instant::now();
        let err = p.chat(req).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
        server.abort();
    }
}
