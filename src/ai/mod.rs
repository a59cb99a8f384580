pub mod cerebras;
pub mod offline;
pub mod openrouter;
pub mod structured;
pub mod types;
pub mod unified;

pub use cerebras::CerebrasProvider;
pub use offline::OfflineProvider;
pub use openrouter::OpenRouterProvider;
pub use structured::generate_structured;
pub use types::{ChatRequest, ChatResponse, LlmError, LlmProvider, ResponseFormat};
pub use unified::AnyProvider;

use serde_json::Value;
use std::time::Duration;

/// HTTP client shared by the providers. `timeout` bounds a whole request,
/// connect through body.
pub(crate) fn build_llm_http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    if let Ok(raw) = std::env::var("LLM_PROXY") {
        let t = raw.trim();
        if !t.is_empty() {
            let url = if t.contains("://") {
                t.to_string()
            } else {
                format!("socks5h://{}", t)
            };
            let proxy = reqwest::Proxy::all(&url).map_err(|e| LlmError::Http(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
    }

    builder.build().map_err(|e| LlmError::Http(e.to_string()))
}

/// Splits a key list from env (comma, semicolon, whitespace separated).
pub(crate) fn parse_api_keys(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect::<Vec<_>>()
    })
    .unwrap_or_default()
}

/// Pulls the assistant text out of an OpenAI-compatible completion body.
/// Accepts `message.content` as a string or a parts array, bare `content`,
/// `text`, and a top level `output_text`.
pub(crate) fn extract_completion_text(raw: &str) -> Result<String, LlmError> {
    let v: Value = serde_json::from_str(raw)
        .map_err(|e| LlmError::InvalidResponse(format!("json parse failed: {e}, raw={raw}")))?;

    if let Some(Value::String(s)) = v.get("output_text") {
        return Ok(s.clone());
    }

    let choice0 = v
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing choices[0], raw={raw}")))?;

    let content = choice0
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice0.get("content"));

    match content {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(arr)) => {
            let mut parts = Vec::new();
            for it in arr {
                if let Some(t) = it.get("text").and_then(|x| x.as_str()) {
                    parts.push(t.to_string());
                } else if let Some(t) = it.as_str() {
                    parts.push(t.to_string());
                }
            }
            Ok(parts.join("\n"))
        }
        Some(_) => Err(LlmError::InvalidResponse(format!(
            "unexpected content type, raw={raw}"
        ))),
        None => match choice0.get("text") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(LlmError::InvalidResponse(format!(
                "missing content/text in choices[0], raw={raw}"
            ))),
        },
    }
}

pub(crate) fn map_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_key_lists() {
        let keys = parse_api_keys(Some("a, b;c\n d".to_string()));
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert!(parse_api_keys(None).is_empty());
    }

    #[test]
    fn extracts_message_content_string() {
        let raw = r#"{"choices":[{"message":{"content":"{\"records\":[]}"}}]}"#;
        assert_eq!(extract_completion_text(raw).unwrap(), r#"{"records":[]}"#);
    }

    #[test]
    fn extracts_content_parts() {
        let raw = r#"{"choices":[{"message":{"content":[{"text":"a"},"b"]}}]}"#;
        assert_eq!(extract_completion_text(raw).unwrap(), "a\nb");
    }

    #[test]
    fn missing_choices_is_invalid() {
        let err = extract_completion_text(r#"{"error":"nope"}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
