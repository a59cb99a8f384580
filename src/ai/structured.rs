use crate::ai::types::{ChatRequest, LlmError, LlmProvider, ResponseFormat};
use regex::Regex;
use serde_json::Value;

/// Schema-constrained generation: asks the provider for a JSON document
/// matching `schema` and returns the parsed value. Fails when the reply is
/// not a JSON object.
pub async fn generate_structured<P: LlmProvider + ?Sized>(
    provider: &P,
    mut req: ChatRequest,
    schema_name: &str,
    schema: Value,
) -> Result<Value, LlmError> {
    req.response_format = Some(ResponseFormat::JsonSchema {
        name: schema_name.to_string(),
        schema,
    });
    let resp = provider.chat(req).await?;
    parse_json_reply(&resp.text)
}

/// Accepts a bare JSON object, a fenced ```json block, or prose wrapped
/// around a single object.
pub fn parse_json_reply(text: &str) -> Result<Value, LlmError> {
    let trimmed = text.trim();
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }

    let fence = Regex::new(r"(?s)```(?:json)?\s*(.*?)```")
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    if let Some(body) = fence.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(body.as_str().trim()) {
            return Ok(v);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(&trimmed[start..=end])
            {
                return Ok(v);
            }
        }
    }

    let preview: String = trimmed.chars().take(200).collect();
    Err(LlmError::InvalidResponse(format!(
        "reply is not a JSON object: {preview}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Option<ChatRequest>>,
    }

    #[async_trait]
    impl LlmProvider for Recording {
        async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
            *self.seen.lock().unwrap() = Some(req);
            Ok(ChatResponse {
                text: "```json\n{\"records\": []}\n```".to_string(),
                raw: None,
            })
        }
    }

    #[test]
    fn parses_plain_fenced_and_wrapped_objects() {
        assert_eq!(parse_json_reply(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_json_reply("```json\n{\"a\":2}\n```").unwrap(),
            json!({"a": 2})
        );
        assert_eq!(
            parse_json_reply("Here you go: {\"a\":3} enjoy").unwrap(),
            json!({"a": 3})
        );
    }

    #[test]
    fn rejects_non_objects() {
        assert!(parse_json_reply("[1,2,3]").is_err());
        assert!(parse_json_reply("no json here").is_err());
    }

    #[tokio::test]
    async fn attaches_schema_as_response_format() {
        let p = Recording {
            seen: Mutex::new(None),
        };
        let req = ChatRequest {
            model: "m".to_string(),
            system: "s".to_string(),
            user: "u".to_string(),
            temperature: 0.5,
            max_tokens: 100,
            response_format: None,
        };
        let out = generate_structured(&p, req, "pets", json!({"type": "object"}))
            .await
            .unwrap();
        assert_eq!(out, json!({"records": []}));

        let seen = p.seen.lock().unwrap().clone().unwrap();
        let format = seen.response_format.unwrap().to_json();
        assert_eq!(format["json_schema"]["name"], "pets");
        assert_eq!(format["json_schema"]["schema"], json!({"type": "object"}));
    }
}
