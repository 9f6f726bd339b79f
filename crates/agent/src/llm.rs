//! Chat-completion client.
//!
//! One request per question: a system message carrying the assembled context and a
//! user message carrying the raw question. The trimmed text of the first choice is
//! the answer. No retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid api key format")]
    Authentication,
    #[error("completion api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode completion response: {0}")]
    Decode(String),
    #[error("completion response contained no choices")]
    EmptyResponse,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_context: &str, user_question: &str) -> Result<String, LlmError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ChatCompletionRequest {
    pub fn two_message(model: &str, system_context: &str, user_question: &str) -> Self {
        Self {
            model: model.to_owned(),
            messages: vec![
                ChatMessage { role: ChatRole::System, content: system_context.to_owned() },
                ChatMessage { role: ChatRole::User, content: user_question.to_owned() },
            ],
        }
    }
}

impl ChatCompletionResponse {
    /// Trimmed text of the first choice.
    pub fn first_answer(&self) -> Result<String, LlmError> {
        let choice = self.choices.first().ok_or(LlmError::EmptyResponse)?;
        let content = choice.message.content.as_deref().ok_or(LlmError::EmptyResponse)?;
        Ok(content.trim().to_owned())
    }
}

/// OpenAI-compatible `/v1/chat/completions` client.
pub struct OpenAiChatClient {
    api_key: SecretString,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            http_client,
        })
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose_secret()))
                .map_err(|_| LlmError::Authentication)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, system_context: &str, user_question: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest::two_message(&self.model, system_context, user_question);

        let response =
            self.http_client.post(&url).headers(self.headers()?).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|parsed| parsed.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api { status: status.as_u16(), message });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;
        parsed.first_answer()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ChatCompletionRequest, LlmClient, LlmError, OpenAiChatClient};

    fn client(base_url: &str) -> OpenAiChatClient {
        OpenAiChatClient::new(
            "sk-test".to_string().into(),
            base_url,
            "gpt-4",
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[test]
    fn request_carries_system_then_user_message() {
        let request = ChatCompletionRequest::two_message("gpt-4", "context", "question");
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(
            value,
            json!({
                "model": "gpt-4",
                "messages": [
                    { "role": "system", "content": "context" },
                    { "role": "user", "content": "question" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "messages": [
                    { "role": "system", "content": "ctx" },
                    { "role": "user", "content": "What is FailSafe?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  A monitoring tool.\n" } },
                    { "message": { "role": "assistant", "content": "ignored" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server.uri()).complete("ctx", "What is FailSafe?").await;

        assert_eq!(answer.expect("answer"), "A monitoring tool.");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let error = client(&server.uri()).complete("ctx", "q").await.expect_err("no choices");

        assert!(matches!(error, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn upstream_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached", "type": "requests" }
            })))
            .mount(&server)
            .await;

        let error = client(&server.uri()).complete("ctx", "q").await.expect_err("rate limited");

        assert!(matches!(
            error,
            LlmError::Api { status: 429, ref message } if message == "Rate limit reached"
        ));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&format!("{}/", server.uri())).complete("ctx", "q").await;

        assert_eq!(answer.expect("answer"), "ok");
    }
}
