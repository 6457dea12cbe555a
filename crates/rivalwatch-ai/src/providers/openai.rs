use crate::error::{AiError, Result};
use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use crate::{GenerationRequest, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI Chat Completions provider（也适用于其他兼容接口）
#[derive(Clone)]
pub struct OpenAIProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
}

impl OpenAIProvider {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        max_tokens: Option<usize>,
        temperature: Option<f32>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs.unwrap_or(120)))
            .build()?;

        Ok(Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
            max_tokens,
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIProvider {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(&request.prompt));

        let req = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature.or(self.temperature),
            max_tokens: request.max_tokens.or(self.max_tokens),
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = request.prompt.len(),
            "Calling chat completions API"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Chat completions request failed");
            return Err(AiError::Http {
                provider: self.provider().to_string(),
                status,
                body,
            });
        }

        let chat: ChatResponse = resp.json().await?;
        tracing::debug!(usage = ?chat.usage, "Chat completions response received");

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::EmptyResponse {
                provider: self.provider().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn provider(url: String) -> OpenAIProvider {
        OpenAIProvider::new("sk-test".into(), None, Some(url), Some(5), Some(300), Some(0.7)).unwrap()
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJsonString(
                r#"{"model": "gpt-4o-mini", "max_tokens": 300}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "  A crowded market.  "}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
            }"#,
            )
            .create_async()
            .await;

        let text = provider(server.url())
            .generate(&GenerationRequest::new("Describe Acme"))
            .await
            .unwrap();
        assert_eq!(text, "A crowded market.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = provider(server.url())
            .generate(&GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn http_errors_carry_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": "bad key"}"#)
            .create_async()
            .await;

        let err = provider(server.url())
            .generate(&GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Http { status: 401, .. }));
    }
}
