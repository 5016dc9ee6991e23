//! OpenAI chat-completions backed dialogue generator.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AiError, AiProvider, AiResult};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl ChatResponse {
    fn into_text(self) -> AiResult<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AiError::EmptyChoices)
    }
}

/// Posts a single user message and returns the first choice's content.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: Arc<str>,
    model: Arc<str>,
}

impl OpenAiProvider {
    /// Client for `model`, failing when no key is configured.
    pub fn new(api_key: Option<String>, model: &str, timeout: Duration) -> AiResult<Self> {
        let api_key = api_key.ok_or(AiError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AiError::Request {
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: Arc::from(api_key),
            model: Arc::from(model),
        })
    }
}

impl AiProvider for OpenAiProvider {
    fn fetch(&self, prompt: String) -> BoxFuture<'static, AiResult<String>> {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let model = self.model.clone();

        Box::pin(async move {
            let body = ChatRequest {
                model: &model,
                messages: [ChatMessage {
                    role: "user",
                    content: &prompt,
                }],
            };

            let response = client
                .post(COMPLETIONS_URL)
                .bearer_auth(api_key.as_ref())
                .json(&body)
                .send()
                .await
                .map_err(|err| AiError::Request {
                    message: err.to_string(),
                })?;

            if response.status() != StatusCode::OK {
                return Err(AiError::Status {
                    status: response.status().as_u16(),
                });
            }

            let payload = response
                .json::<ChatResponse>()
                .await
                .map_err(|err| AiError::Decode {
                    message: err.to_string(),
                })?;

            debug!(model = %payload.model, choices = payload.choices.len(), "received dialogue completion");
            payload.into_text()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_single_user_message() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "user", "content": "hello" }]
            })
        );
    }

    #[test]
    fn first_choice_content_is_returned() {
        let payload: ChatResponse = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":"**A:** *\"b\"*"}},{"message":{"content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.into_text().unwrap(), "**A:** *\"b\"*");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let payload: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(payload.into_text(), Err(AiError::EmptyChoices)));
    }

    #[test]
    fn missing_key_is_rejected() {
        assert!(matches!(
            OpenAiProvider::new(None, "gpt-4o-mini", Duration::from_secs(1)),
            Err(AiError::MissingApiKey)
        ));
    }
}
