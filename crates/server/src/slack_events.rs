//! Events API receiver on the Slack listener.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use faqbot_slack::payload::SlackPayload;
use faqbot_slack::runner::EventsApiRunner;
use faqbot_slack::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use serde_json::json;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SlackEventsState {
    pub verifier: Arc<SignatureVerifier>,
    pub runner: Arc<EventsApiRunner>,
}

pub fn router(state: SlackEventsState) -> Router {
    Router::new().route("/slack/events", post(receive)).with_state(state)
}

pub async fn receive(
    State(state): State<SlackEventsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|value| value.to_str().ok());
    let signature = headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok());
    if let Err(error) = state.verifier.verify(timestamp, signature, &body) {
        warn!(
            event_name = "ingress.slack.signature_rejected",
            error = %error,
            "rejecting unsigned slack request"
        );
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let payload = match SlackPayload::parse(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(
                event_name = "ingress.slack.payload_invalid",
                error = %error,
                "slack payload could not be parsed"
            );
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match payload {
        SlackPayload::UrlVerification { challenge } => {
            info!(event_name = "ingress.slack.url_verification", "answering url verification");
            Json(json!({ "challenge": challenge })).into_response()
        }
        SlackPayload::EventCallback(callback) => {
            let envelope = callback.into_envelope();
            let runner = state.runner.clone();
            tokio::spawn(async move {
                runner.process(&envelope).await;
            });
            StatusCode::OK.into_response()
        }
        SlackPayload::Unsupported => StatusCode::OK.into_response(),
    }
}
