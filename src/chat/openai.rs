use super::intent::{Intent, IntentParser, parse_model_reply};
use crate::{
    config::settings::ChatSettings,
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = r#"You are the assistant of a small bank. You reply with exactly one JSON object and nothing else.
Pick one of these shapes:
{"intent": "check_balance"}
{"intent": "transfer", "to": "<account id, phone number or holder name>", "amount": <number>}
{"intent": "deposit", "amount": <number>}
{"intent": "history"}
{"intent": "last_transaction"}
{"intent": "search", "query": "<name or phone fragment>"}
{"intent": "rename", "name": "<new holder name>"}
{"intent": "unknown", "reply": "<short clarifying question>"}
Amounts are in major currency units. If the recipient or amount of a transfer is missing, use "unknown" and ask for it."#;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Parses intents with an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiIntentParser {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiIntentParser {
    /// Builds a parser for the configured model and endpoint.
    #[must_use]
    pub fn new(api_key: String, settings: &ChatSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        }
    }
}

impl std::fmt::Debug for OpenAiIntentParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiIntentParser")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IntentParser for OpenAiIntentParser {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn parse(&self, text: &str) -> Result<Intent> {
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text.trim(),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Upstream {
                message: format!("chat completion request failed: {e}"),
            })?;

        let body: ChatResponse = response.json().await.map_err(|e| Error::Upstream {
            message: format!("unexpected chat completion response: {e}"),
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!("Model replied: {}", content);

        Ok(parse_model_reply(&content))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-test",
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "what's my balance",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "what's my balance");
    }

    #[test]
    fn test_response_content_extraction() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"intent\": \"history\"}"}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let content = response.choices[0].message.content.clone().unwrap();
        assert_eq!(parse_model_reply(&content), Intent::History);
    }

    #[test]
    fn test_null_content_is_tolerated() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let settings = ChatSettings {
            model: "m".to_string(),
            api_base: "http://localhost:9999/v1/".to_string(),
        };
        let parser = OpenAiIntentParser::new("key".to_string(), &settings);
        assert_eq!(parser.api_base, "http://localhost:9999/v1");
        assert_eq!(parser.model, "m");
    }
}
