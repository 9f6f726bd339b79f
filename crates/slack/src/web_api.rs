use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::Reply;

#[derive(Debug, Error)]
pub enum WebApiError {
    #[error("slack web api request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("slack web api returned status {0}")]
    Status(u16),
    #[error("slack web api error: {0}")]
    Api(String),
}

/// Sends a reply into its channel.
#[async_trait]
pub trait ChatPoster: Send + Sync {
    async fn post_message(&self, reply: &Reply) -> Result<(), WebApiError>;
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackWebClient {
    bot_token: SecretString,
    base_url: String,
    http_client: reqwest::Client,
}

impl SlackWebClient {
    pub fn new(
        bot_token: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WebApiError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            bot_token,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http_client,
        })
    }
}

#[async_trait]
impl ChatPoster for SlackWebClient {
    async fn post_message(&self, reply: &Reply) -> Result<(), WebApiError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.bot_token.expose_secret())
            .json(&PostMessageRequest { channel: &reply.channel_id, text: &reply.text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebApiError::Status(status.as_u16()));
        }

        let body: WebApiResponse = response.json().await?;
        if !body.ok {
            return Err(WebApiError::Api(body.error.unwrap_or_else(|| "unknown_error".to_owned())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ChatPoster, SlackWebClient, WebApiError};
    use crate::events::Reply;

    fn client(base_url: &str) -> SlackWebClient {
        SlackWebClient::new("xoxb-test".to_string().into(), base_url, Duration::from_secs(5))
            .expect("client")
    }

    fn reply() -> Reply {
        Reply { channel_id: "C1".to_owned(), text: "A monitoring tool.".to_owned() }
    }

    #[tokio::test]
    async fn posts_reply_to_originating_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .and(body_json(json!({ "channel": "C1", "text": "A monitoring tool." })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri()).post_message(&reply()).await.expect("posted");
    }

    #[tokio::test]
    async fn ok_false_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
            )
            .mount(&server)
            .await;

        let error = client(&server.uri()).post_message(&reply()).await.expect_err("api error");

        assert!(matches!(error, WebApiError::Api(ref code) if code == "channel_not_found"));
    }
}
