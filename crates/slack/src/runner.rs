use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::events::{EventContext, EventDispatcher, HandlerResult, SlackEnvelope, SlackEvent};
use crate::web_api::ChatPoster;

/// Processes acknowledged Events API envelopes: dispatches each one and posts any
/// reply back to Slack. Failures are logged and never surface to the caller.
pub struct EventsApiRunner {
    dispatcher: EventDispatcher,
    poster: Arc<dyn ChatPoster>,
}

impl EventsApiRunner {
    pub fn new(dispatcher: EventDispatcher, poster: Arc<dyn ChatPoster>) -> Self {
        Self { dispatcher, poster }
    }

    pub async fn process(&self, envelope: &SlackEnvelope) -> HandlerResult {
        let channel_id = channel_field(envelope);
        info!(
            event_name = "ingress.slack.envelope_received",
            envelope_id = %envelope.envelope_id,
            event_type = ?envelope.event.event_type(),
            correlation_id = %envelope.envelope_id,
            channel_id = channel_id.unwrap_or("unknown"),
            "received slack envelope"
        );

        let context = EventContext { correlation_id: envelope.envelope_id.clone() };
        let result = match self.dispatcher.dispatch(envelope, &context).await {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    channel_id = channel_id.unwrap_or("unknown"),
                    error = %error,
                    "event dispatch failed"
                );
                return HandlerResult::Processed;
            }
        };

        if let HandlerResult::Responded(reply) = &result {
            if let Err(error) = self.poster.post_message(reply).await {
                warn!(
                    event_name = "egress.slack.reply_failed",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    channel_id = %reply.channel_id,
                    error = %error,
                    "failed to post slack reply"
                );
            } else {
                debug!(
                    event_name = "egress.slack.reply_sent",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    channel_id = %reply.channel_id,
                    "posted slack reply"
                );
            }
        }

        result
    }
}

fn channel_field(envelope: &SlackEnvelope) -> Option<&str> {
    match &envelope.event {
        SlackEvent::Message(event) => Some(event.channel_id.as_str()),
        SlackEvent::Unsupported { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::EventsApiRunner;
    use crate::events::{
        message_dispatcher, EventContext, EventHandlerError, HandlerResult, MessageEvent,
        MessageService, Reply, SlackEnvelope, SlackEvent,
    };
    use crate::web_api::{ChatPoster, WebApiError};

    struct EchoService;

    #[async_trait]
    impl MessageService for EchoService {
        async fn answer_message(
            &self,
            text: &str,
            _ctx: &EventContext,
        ) -> Result<String, EventHandlerError> {
            Ok(format!("echo: {text}"))
        }
    }

    #[derive(Default)]
    struct RecordingPoster {
        posted: Mutex<Vec<Reply>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatPoster for RecordingPoster {
        async fn post_message(&self, reply: &Reply) -> Result<(), WebApiError> {
            self.posted.lock().await.push(reply.clone());
            if self.fail {
                return Err(WebApiError::Api("not_in_channel".to_owned()));
            }
            Ok(())
        }
    }

    fn envelope(bot_id: Option<&str>) -> SlackEnvelope {
        SlackEnvelope {
            envelope_id: "Ev1".to_owned(),
            event: SlackEvent::Message(MessageEvent {
                channel_id: "C42".to_owned(),
                user_id: Some("U1".to_owned()),
                text: Some("hi".to_owned()),
                ts: "1".to_owned(),
                subtype: None,
                bot_id: bot_id.map(str::to_owned),
            }),
        }
    }

    #[tokio::test]
    async fn answered_message_is_posted_back() {
        let poster = Arc::new(RecordingPoster::default());
        let runner = EventsApiRunner::new(message_dispatcher(EchoService), poster.clone());

        let result = runner.process(&envelope(None)).await;

        let expected = Reply { channel_id: "C42".to_owned(), text: "echo: hi".to_owned() };
        assert_eq!(result, HandlerResult::Responded(expected.clone()));
        assert_eq!(*poster.posted.lock().await, vec![expected]);
    }

    #[tokio::test]
    async fn bot_message_posts_nothing() {
        let poster = Arc::new(RecordingPoster::default());
        let runner = EventsApiRunner::new(message_dispatcher(EchoService), poster.clone());

        let result = runner.process(&envelope(Some("B1"))).await;

        assert_eq!(result, HandlerResult::Ignored);
        assert!(poster.posted.lock().await.is_empty());
    }

    #[tokio::test]
    async fn post_failure_is_swallowed() {
        let poster = Arc::new(RecordingPoster { fail: true, ..RecordingPoster::default() });
        let runner = EventsApiRunner::new(message_dispatcher(EchoService), poster.clone());

        let result = runner.process(&envelope(None)).await;

        assert!(matches!(result, HandlerResult::Responded(_)));
        assert_eq!(poster.posted.lock().await.len(), 1);
    }
}
